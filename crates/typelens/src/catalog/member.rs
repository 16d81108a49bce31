//! Member descriptors: fields, properties and methods

use std::fmt;

use typelens_sdk::{MethodFn, TypeId};

use crate::annotations::AnnotationInstance;

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Stored field
    Field,
    /// Accessor-backed property
    Property,
    /// Callable method
    Method,
}

/// Reference to a type inside a member signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A catalog type (including generic parameters of the declaring type)
    Type(TypeId),
    /// The n-th generic parameter of the method itself
    MethodParam(usize),
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        TypeRef::Type(id)
    }
}

/// Constraints a type argument must satisfy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericConstraints {
    /// Types the argument must be a subtype of (or equal to)
    pub bounds: Vec<TypeId>,
    /// Argument must be a value-kind type
    pub value_kind: bool,
    /// Argument must be a reference (non value-kind) type
    pub reference_kind: bool,
}

impl GenericConstraints {
    /// Whether no constraint is present
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty() && !self.value_kind && !self.reference_kind
    }
}

/// A generic parameter of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    /// Parameter name (e.g. "T")
    pub name: String,
    /// Constraints on bound arguments
    pub constraints: GenericConstraints,
}

impl GenericParam {
    /// Unconstrained parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: GenericConstraints::default(),
        }
    }

    /// Require the argument to be a subtype of `bound`
    pub fn bound(mut self, bound: TypeId) -> Self {
        self.constraints.bounds.push(bound);
        self
    }

    /// Require a value-kind argument
    pub fn value_kind(mut self) -> Self {
        self.constraints.value_kind = true;
        self
    }

    /// Require a reference-kind argument
    pub fn reference_kind(mut self) -> Self {
        self.constraints.reference_kind = true;
        self
    }
}

/// Parameter information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
    /// Position in the parameter list
    pub index: usize,
}

/// Member signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// Parameters (empty for fields and properties)
    pub parameters: Vec<ParameterInfo>,
    /// Return type for methods, value type for fields and properties; None = void
    pub return_type: Option<TypeRef>,
    /// Whether the member is static
    pub is_static: bool,
    /// Generic parameters of a method
    pub generic_params: Vec<GenericParam>,
}

impl Signature {
    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Number of generic parameters
    pub fn generic_arity(&self) -> usize {
        self.generic_params.len()
    }

    /// Whether the member is a generic method
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// Every catalog type referenced by the signature
    pub fn referenced_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        let params = self.parameters.iter().map(|p| p.ty);
        let bounds = self
            .generic_params
            .iter()
            .flat_map(|g| g.constraints.bounds.iter().copied().map(TypeRef::Type));
        params
            .chain(self.return_type)
            .chain(bounds)
            .filter_map(|r| match r {
                TypeRef::Type(id) => Some(id),
                TypeRef::MethodParam(_) => None,
            })
    }
}

/// Descriptor for a field, property or method
#[derive(Clone)]
pub struct MemberDescriptor {
    /// Member name
    pub name: String,
    /// Kind
    pub kind: MemberKind,
    /// Type that declares the member
    pub declaring_type: TypeId,
    /// Signature
    pub signature: Signature,
    /// Annotations declared on the member
    pub annotations: Vec<AnnotationInstance>,
    /// Body (methods only)
    pub(crate) body: Option<MethodFn>,
}

impl MemberDescriptor {
    /// Whether the member is static
    pub fn is_static(&self) -> bool {
        self.signature.is_static
    }

    /// Whether the member is a method
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// Whether the method has a callable body
    pub fn is_invocable(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn body(&self) -> Option<&MethodFn> {
        self.body.as_ref()
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declaring_type", &self.declaring_type)
            .field("signature", &self.signature)
            .field("annotations", &self.annotations)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}
