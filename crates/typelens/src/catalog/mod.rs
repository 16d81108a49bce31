//! Type catalog
//!
//! The catalog is the immutable registry every query runs against. It is
//! produced once by a [`CatalogBuilder`] and never mutated afterwards, so a
//! single `Arc<TypeCatalog>` can be shared freely between threads.
//!
//! Besides the descriptors themselves, the catalog stores data precomputed at
//! build time:
//! - the ancestor chain of every type (the type itself first)
//! - the flattened capability set of every type, transitive through base
//!   types and interface inheritance

mod builder;
mod descriptor;
mod member;

pub use builder::{
    CatalogBuilder, FieldDefinition, MemberDefinition, MethodDefinition, TypeDefinition,
    INSTANTIATION_LIMIT,
};
pub use descriptor::{TypeDescriptor, TypeFlags, TypeKind};
pub use member::{
    GenericConstraints, GenericParam, MemberDescriptor, MemberKind, ParameterInfo, Signature,
    TypeRef,
};

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use typelens_sdk::TypeId;

use crate::error::CatalogError;

/// Identifier of a catalog partition (the "home module" of a type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Module holding the builtin types
    pub const CORE: ModuleId = ModuleId(0);

    pub(crate) const fn new(index: u32) -> Self {
        ModuleId(index)
    }

    /// Raw index of this id
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A catalog partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module id
    pub id: ModuleId,
    /// Module name
    pub name: String,
}

/// Immutable registry of every known type
#[derive(Debug)]
pub struct TypeCatalog {
    types: Vec<TypeDescriptor>,
    modules: Vec<ModuleInfo>,
    name_to_id: FxHashMap<String, TypeId>,
    rust_types: FxHashMap<std::any::TypeId, TypeId>,
    hierarchies: Vec<Box<[TypeId]>>,
    capabilities: Vec<FxHashSet<TypeId>>,
}

impl TypeCatalog {
    /// Get a type by id
    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.index())
    }

    /// Get a type by name. When several modules define the same name, the
    /// first registered wins
    pub fn by_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.name_to_id.get(name).and_then(|id| self.get(*id))
    }

    /// Id of the first type registered under `name`
    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Catalog type bound to the Rust type `T`
    pub fn type_of<T: 'static>(&self) -> Option<TypeId> {
        self.rust_types.get(&std::any::TypeId::of::<T>()).copied()
    }

    /// Name of a type, or `"<unknown>"`
    pub fn name_of(&self, id: TypeId) -> &str {
        self.get(id).map(|t| t.name.as_str()).unwrap_or("<unknown>")
    }

    /// All types in id order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Types whose home module is `module`, in id order
    pub fn types_in(&self, module: ModuleId) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().filter(move |t| t.module == module)
    }

    /// Get a module by id
    pub fn module(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get(id.index())
    }

    /// Find a module by name
    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.id)
    }

    /// All modules
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog has no types (never true for a built catalog)
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Ancestor chain of `id`, starting with `id` itself. Empty for unknown ids
    pub fn hierarchy(&self, id: TypeId) -> &[TypeId] {
        self.hierarchies.get(id.index()).map(|h| &h[..]).unwrap_or(&[])
    }

    /// Flattened capability set of `id`
    pub fn capabilities(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.capabilities.get(id.index()).into_iter().flatten().copied()
    }

    /// Whether `id` implements the interface `capability`, directly or transitively
    pub fn implements(&self, id: TypeId, capability: TypeId) -> bool {
        self.capabilities
            .get(id.index())
            .is_some_and(|caps| caps.contains(&capability))
    }
}

static GLOBAL: OnceCell<Arc<TypeCatalog>> = OnceCell::new();

/// Install the process-wide catalog. Only the first call succeeds
pub fn install(catalog: TypeCatalog) -> Result<Arc<TypeCatalog>, CatalogError> {
    let catalog = Arc::new(catalog);
    GLOBAL
        .set(Arc::clone(&catalog))
        .map_err(|_| CatalogError::AlreadyInstalled)?;
    tracing::debug!(types = catalog.len(), "installed process-wide type catalog");
    Ok(catalog)
}

/// The process-wide catalog, if one was installed
pub fn global() -> Option<Arc<TypeCatalog>> {
    GLOBAL.get().cloned()
}
