//! Error types for catalog construction, configuration and invocation

use thiserror::Error;
use typelens_sdk::{CallError, TypeId};

/// Errors raised while building or installing a type catalog
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// A type id that was never registered
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// The base chain (or interface graph) loops back on itself
    #[error("Circular inheritance detected at type {type_name}")]
    CyclicInheritance {
        /// Type where the cycle was detected
        type_name: String,
    },

    /// A type cannot derive from the given base
    #[error("Type {type_name} cannot use {base_name} as its base type")]
    InvalidBase {
        /// Derived type
        type_name: String,
        /// Rejected base
        base_name: String,
    },

    /// A declared capability is not an interface
    #[error("Type {type_name} cannot implement {capability_name}: not an interface")]
    NotAnInterface {
        /// Implementing type
        type_name: String,
        /// Rejected capability
        capability_name: String,
    },

    /// Wrong number of type arguments for a generic definition
    #[error("Invalid type argument count for {definition}: expected {expected}, got {actual}")]
    GenericArity {
        /// Generic definition name
        definition: String,
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// A member signature refers to something that does not exist
    #[error("Invalid member {type_name}.{member}: {reason}")]
    InvalidMember {
        /// Declaring type
        type_name: String,
        /// Member name
        member: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two types with the same name in one module
    #[error("Duplicate type {name} in module {module}")]
    DuplicateType {
        /// Type name
        name: String,
        /// Module name
        module: String,
    },

    /// A Rust type bound to two catalog types
    #[error("Rust type {rust_name} is already bound to {type_name}")]
    DuplicateRustBinding {
        /// Rust type name
        rust_name: String,
        /// Catalog type already holding the binding
        type_name: String,
    },

    /// Generic instantiation did not reach a fixed point
    #[error("Generic instantiation limit of {limit} exceeded while expanding {type_name}")]
    InstantiationLimit {
        /// Type being expanded when the limit was hit
        type_name: String,
        /// Limit
        limit: usize,
    },

    /// The process-wide catalog was already installed
    #[error("A process-wide type catalog is already installed")]
    AlreadyInstalled,
}

/// Errors raised by the dynamic invoker
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvokeError {
    /// No member matches the requested name, arity and static-ness
    #[error("Method <{method}> with {arity} argument(s) not found in {kind} members of type <{type_name}>",
        kind = member_scope(.is_static))]
    MethodNotFound {
        /// Searched type
        type_name: String,
        /// Requested method name
        method: String,
        /// Requested argument count
        arity: usize,
        /// Whether a static member was requested
        is_static: bool,
    },

    /// The resolved method failed while executing
    #[error("Invocation of {method} failed: {source}")]
    InvocationFailure {
        /// Qualified method name
        method: String,
        /// Failure raised by the method body
        #[source]
        source: CallError,
    },

    /// Generic instantiation with incompatible type arguments
    #[error("Cannot instantiate {method}: {reason}")]
    TypeResolution {
        /// Qualified method name
        method: String,
        /// Why the type arguments were rejected
        reason: String,
    },
}

fn member_scope(is_static: &bool) -> &'static str {
    if *is_static {
        "static"
    } else {
        "instance"
    }
}

impl InvokeError {
    /// Underlying body failure, if this is an `InvocationFailure`
    pub fn call_error(&self) -> Option<&CallError> {
        match self {
            InvokeError::InvocationFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
