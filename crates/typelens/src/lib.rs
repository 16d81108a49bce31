//! Typelens: runtime type catalog and introspection
//!
//! This crate answers questions about types and members at runtime and
//! invokes methods chosen by name:
//! - **Catalog**: immutable registry of types, members and annotations (`catalog`)
//! - **Navigation**: element types and generic arguments through ancestor chains (`navigator`)
//! - **Derived types**: scope scans for assignable types (`derived`)
//! - **Relationships**: subtype-or-same checks for types and instances (`relations`)
//! - **Annotations**: inheritance-aware annotation lookup (`annotations`)
//! - **Invocation**: name-based dynamic dispatch (`invoke`)
//!
//! # Example
//!
//! ```rust,ignore
//! use typelens::{CatalogBuilder, MethodDefinition, Reflector, Target, TypeDefinition};
//! use typelens_sdk::{TypeId, Value};
//!
//! let mut builder = CatalogBuilder::new();
//! let app = builder.module("app");
//! let greeter = builder.define(
//!     TypeDefinition::class("Greeter", app).method(
//!         MethodDefinition::new("Greet", |f| Ok(Value::str(format!("hello {}", f.arg::<String>(0)?))))
//!             .param("name", TypeId::STRING)
//!             .returns(TypeId::STRING)
//!             .as_static(),
//!     ),
//! )?;
//!
//! let reflector = Reflector::new(std::sync::Arc::new(builder.build()?));
//! let greeting = reflector.invoke(Target::Type(greeter), "Greet", &[Value::str("bob")], &[])?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annotations;
pub mod catalog;
pub mod config;
pub mod derived;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod navigator;
pub mod reflector;
pub mod relations;

pub use annotations::{get_annotation, get_annotations, has_annotation, AnnotatedMember, Annotation, AnnotationInstance};
pub use catalog::{
    CatalogBuilder, FieldDefinition, GenericParam, MemberDescriptor, MemberKind, MethodDefinition,
    ModuleId, TypeCatalog, TypeDefinition, TypeDescriptor, TypeKind, TypeRef,
};
pub use config::ReflectConfig;
pub use derived::{find_derived_types, find_derived_types_of, DerivedTypeQuery, Scope};
pub use error::{CatalogError, ConfigError, InvokeError};
pub use invoke::{Invoker, Target};
pub use navigator::{resolve_element_type, resolve_generic_arguments};
pub use reflector::Reflector;
pub use relations::{instance_is, is_instance_subtype_or_same, is_subtype_or_same};

// Re-export the SDK so hosts need a single dependency
pub use typelens_sdk;
