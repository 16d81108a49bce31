//! Type descriptors
//!
//! One `TypeDescriptor` exists per type known to a catalog. Descriptors are
//! created by the [`CatalogBuilder`](super::CatalogBuilder) and never change
//! afterwards.

use typelens_sdk::TypeId;

use super::member::{MemberDescriptor, MemberKind};
use super::ModuleId;
use crate::annotations::AnnotationInstance;

/// Type kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference types with single inheritance
    Class,
    /// Capability contracts; always abstract
    Interface,
    /// User-defined value types
    Struct,
    /// Enumerations
    Enum,
    /// Builtin primitives (bool, numbers, void)
    Primitive,
    /// Native arrays (`T[]`)
    Array,
    /// Placeholder for a type parameter of a generic definition
    GenericParameter,
}

impl TypeKind {
    /// Lowercase kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Primitive => "primitive",
            TypeKind::Array => "array",
            TypeKind::GenericParameter => "generic parameter",
        }
    }
}

/// Flags describing a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeFlags {
    /// Cannot be instantiated directly
    pub is_abstract: bool,
    /// Copied by value
    pub is_value_kind: bool,
    /// Builtin primitive
    pub is_primitive: bool,
    /// Enumeration
    pub is_enum: bool,
    /// Cannot be derived from
    pub is_sealed: bool,
}

impl TypeFlags {
    /// Default flags implied by a kind
    pub fn for_kind(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => TypeFlags::default(),
            TypeKind::Interface => TypeFlags {
                is_abstract: true,
                ..TypeFlags::default()
            },
            TypeKind::Struct => TypeFlags {
                is_value_kind: true,
                is_sealed: true,
                ..TypeFlags::default()
            },
            TypeKind::Enum => TypeFlags {
                is_value_kind: true,
                is_enum: true,
                is_sealed: true,
                ..TypeFlags::default()
            },
            TypeKind::Primitive => TypeFlags {
                is_value_kind: true,
                is_primitive: true,
                is_sealed: true,
                ..TypeFlags::default()
            },
            TypeKind::Array => TypeFlags {
                is_sealed: true,
                ..TypeFlags::default()
            },
            TypeKind::GenericParameter => TypeFlags::default(),
        }
    }
}

/// Descriptor for one type in the catalog
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Catalog id
    pub id: TypeId,
    /// Display name (`List<i32>`, `i32[]` for constructed types)
    pub name: String,
    /// Home module
    pub module: ModuleId,
    /// Kind
    pub kind: TypeKind,
    /// Flags
    pub flags: TypeFlags,
    /// Immediate base type (None for root types)
    pub base: Option<TypeId>,
    /// Directly declared capabilities (interfaces)
    pub interfaces: Vec<TypeId>,
    /// Generic parameters of a definition, or bound arguments of an instantiation
    pub generic_arguments: Vec<TypeId>,
    /// Generic definition this type was instantiated from
    pub generic_definition: Option<TypeId>,
    /// Element type (arrays only)
    pub element_type: Option<TypeId>,
    /// Declared members in declaration order
    pub members: Vec<MemberDescriptor>,
    /// Annotations declared on the type itself
    pub annotations: Vec<AnnotationInstance>,
    /// Bound Rust type, if any
    pub(crate) rust_type: Option<std::any::TypeId>,
}

impl TypeDescriptor {
    pub(crate) fn new(id: TypeId, name: String, module: ModuleId, kind: TypeKind) -> Self {
        Self {
            id,
            name,
            module,
            kind,
            flags: TypeFlags::for_kind(kind),
            base: None,
            interfaces: Vec::new(),
            generic_arguments: Vec::new(),
            generic_definition: None,
            element_type: None,
            members: Vec::new(),
            annotations: Vec::new(),
            rust_type: None,
        }
    }

    /// Whether the type is abstract (interfaces always are)
    pub fn is_abstract(&self) -> bool {
        self.flags.is_abstract
    }

    /// Whether the type is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether the type is a native array
    pub fn is_array(&self) -> bool {
        self.kind == TypeKind::Array
    }

    /// Whether the type has generic parameters or arguments
    pub fn is_generic(&self) -> bool {
        !self.generic_arguments.is_empty()
    }

    /// Whether the type is an open generic definition
    pub fn is_generic_definition(&self) -> bool {
        self.is_generic() && self.generic_definition.is_none()
    }

    /// Whether the type was constructed from other types (array, instantiation,
    /// generic parameter) rather than declared by a module
    pub fn is_constructed(&self) -> bool {
        matches!(self.kind, TypeKind::Array | TypeKind::GenericParameter)
            || self.generic_definition.is_some()
    }

    /// Whether a Rust type is bound to this descriptor
    pub fn has_rust_binding(&self) -> bool {
        self.rust_type.is_some()
    }

    /// Declared members with the given name
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberDescriptor> + 'a {
        self.members.iter().filter(move |m| m.name == name)
    }

    /// Declared methods
    pub fn methods(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.kind == MemberKind::Method)
    }

    /// Declared fields
    pub fn fields(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.kind == MemberKind::Field)
    }

    /// Declared properties
    pub fn properties(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|m| m.kind == MemberKind::Property)
    }

    /// First declared member with the given name
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}
