//! Subtype relationships between types and instances
//!
//! Assignability is one predicate covering three cases: the types are
//! equal, `derived` has `base` in its class chain, or `derived` implements
//! `base` as a capability (directly or transitively). [`is_strict_subclass`]
//! answers the class-chain question alone.

use typelens_sdk::{Instance, TypeId};

use crate::catalog::TypeCatalog;

/// Check if `derived` is `base`, inherits from it, or implements it
pub fn is_subtype_or_same(catalog: &TypeCatalog, derived: TypeId, base: TypeId) -> bool {
    derived == base
        || is_strict_subclass(catalog, derived, base)
        || catalog.implements(derived, base)
}

/// Check if `base` is a strict ancestor of `derived` through the class chain
pub fn is_strict_subclass(catalog: &TypeCatalog, derived: TypeId, base: TypeId) -> bool {
    catalog
        .hierarchy(derived)
        .iter()
        .skip(1)
        .any(|ancestor| *ancestor == base)
}

/// Check if the runtime type of `derived` is a subtype of (or the same as)
/// the runtime type of `base`
pub fn is_instance_subtype_or_same(catalog: &TypeCatalog, base: &Instance, derived: &Instance) -> bool {
    is_subtype_or_same(catalog, derived.type_id(), base.type_id())
}

/// Check if an instance is assignable to `base`
pub fn instance_is(catalog: &TypeCatalog, base: TypeId, instance: &Instance) -> bool {
    is_subtype_or_same(catalog, instance.type_id(), base)
}
