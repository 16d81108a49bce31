//! Type graph navigation
//!
//! Walks a type's ancestor chain to answer container questions: which element
//! type a collection holds, and which generic arguments it was closed over.
//! The walk drills through non-generic subclasses of generic containers, so a
//! `Scores : List<i32>` reports `i32` as its element type.

use typelens_sdk::TypeId;

use crate::catalog::{TypeCatalog, TypeDescriptor};

/// Iterate the ancestor chain of `ty`, starting with `ty` itself.
///
/// Unknown ids yield an empty iterator.
pub fn ancestors(catalog: &TypeCatalog, ty: TypeId) -> impl Iterator<Item = &TypeDescriptor> {
    catalog
        .hierarchy(ty)
        .iter()
        .filter_map(move |id| catalog.get(*id))
}

/// Get the type hierarchy (inheritance chain), the type itself first
pub fn hierarchy(catalog: &TypeCatalog, ty: TypeId) -> Vec<&TypeDescriptor> {
    ancestors(catalog, ty).collect()
}

/// Element type of a container-like type.
///
/// For each type in the chain, nearest first: an array yields its element
/// type, a generic type yields its first generic argument. `None` once the
/// root is reached without a match.
pub fn resolve_element_type(catalog: &TypeCatalog, ty: TypeId) -> Option<TypeId> {
    ancestors(catalog, ty).find_map(|t| {
        if t.is_array() {
            t.element_type
        } else {
            t.generic_arguments.first().copied()
        }
    })
}

/// Full generic argument list of the first generic type in the chain
pub fn resolve_generic_arguments(catalog: &TypeCatalog, ty: TypeId) -> Option<&[TypeId]> {
    ancestors(catalog, ty)
        .find(|t| t.is_generic())
        .map(|t| t.generic_arguments.as_slice())
}

/// Whether any type in the chain (including `ty`) has `arg` among its
/// generic arguments
pub fn has_generic_argument(catalog: &TypeCatalog, ty: TypeId, arg: TypeId) -> bool {
    ancestors(catalog, ty).any(|t| t.generic_arguments.contains(&arg))
}

/// Whether `ty` is a user-defined value type (not primitive, not enum)
pub fn is_struct(catalog: &TypeCatalog, ty: TypeId) -> bool {
    catalog
        .get(ty)
        .is_some_and(|t| t.flags.is_value_kind && !t.flags.is_primitive && !t.flags.is_enum)
}
