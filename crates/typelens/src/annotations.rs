//! Annotation queries
//!
//! Annotations are typed metadata tags attached to types and members while
//! the catalog is built. An annotation kind is any Rust type implementing
//! [`Annotation`]; the kind decides whether subtypes see instances declared
//! on their ancestors.
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Serializable { name: &'static str }
//! impl Annotation for Serializable {}
//!
//! let def = TypeDefinition::class("User", module).annotate(Serializable { name: "user" });
//! // ...
//! let tag = get_annotation::<Serializable>(&catalog, user, true);
//! ```
//!
//! Lookup order is declaration order on the member itself, then (for types,
//! when inheritance applies) each ancestor from nearest to furthest.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::catalog::{MemberDescriptor, TypeCatalog, TypeDescriptor};

/// An annotation kind
pub trait Annotation: Any + fmt::Debug + Send + Sync {
    /// Whether instances declared on a type are visible from its subtypes
    const INHERITED: bool = true;
}

trait Payload: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-erased annotation attached to a type or member
#[derive(Debug, Clone)]
pub struct AnnotationInstance {
    kind: std::any::TypeId,
    kind_name: &'static str,
    inherited: bool,
    payload: Arc<dyn Payload>,
}

impl AnnotationInstance {
    /// Wrap an annotation value
    pub fn new<A: Annotation>(annotation: A) -> Self {
        Self {
            kind: std::any::TypeId::of::<A>(),
            kind_name: std::any::type_name::<A>(),
            inherited: A::INHERITED,
            payload: Arc::new(annotation),
        }
    }

    /// Whether this instance is of kind `A`
    pub fn is<A: Annotation>(&self) -> bool {
        self.kind == std::any::TypeId::of::<A>()
    }

    /// Borrow the payload as `A`
    pub fn downcast_ref<A: Annotation>(&self) -> Option<&A> {
        (*self.payload).as_any().downcast_ref::<A>()
    }

    /// Rust name of the annotation kind
    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }

    /// Whether the kind is visible through inheritance
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }
}

/// Anything annotations can be attached to: types, fields, properties, methods
pub trait AnnotatedMember {
    /// Annotations declared directly on this member
    fn declared_annotations(&self) -> &[AnnotationInstance];

    /// Next member whose inheritable annotations are visible from this one
    fn inheritance_parent<'c>(&self, catalog: &'c TypeCatalog) -> Option<&'c dyn AnnotatedMember>;
}

impl AnnotatedMember for TypeDescriptor {
    fn declared_annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }

    fn inheritance_parent<'c>(&self, catalog: &'c TypeCatalog) -> Option<&'c dyn AnnotatedMember> {
        let base = catalog.get(self.base?)?;
        Some(base)
    }
}

// Members never inherit annotations; only types walk their ancestors.
impl AnnotatedMember for MemberDescriptor {
    fn declared_annotations(&self) -> &[AnnotationInstance] {
        &self.annotations
    }

    fn inheritance_parent<'c>(&self, _catalog: &'c TypeCatalog) -> Option<&'c dyn AnnotatedMember> {
        None
    }
}

fn matching<'a, A: Annotation>(
    catalog: &'a TypeCatalog,
    member: &'a dyn AnnotatedMember,
    inherit: bool,
) -> impl Iterator<Item = &'a A> + 'a {
    let depth = if inherit && A::INHERITED { usize::MAX } else { 1 };
    std::iter::successors(Some(member), move |m| m.inheritance_parent(catalog))
        .take(depth)
        .flat_map(|m| m.declared_annotations().iter())
        .filter_map(|a| a.downcast_ref::<A>())
}

/// First annotation of kind `A` on `member`, falling back to ancestors when
/// `inherit` is set and the kind is inheritable
pub fn get_annotation<'a, A: Annotation>(
    catalog: &'a TypeCatalog,
    member: &'a dyn AnnotatedMember,
    inherit: bool,
) -> Option<&'a A> {
    matching::<A>(catalog, member, inherit).next()
}

/// All annotations of kind `A`, nearest first, preserving multiplicity
pub fn get_annotations<'a, A: Annotation>(
    catalog: &'a TypeCatalog,
    member: &'a dyn AnnotatedMember,
    inherit: bool,
) -> Vec<&'a A> {
    matching::<A>(catalog, member, inherit).collect()
}

/// Whether `member` carries (or inherits) an annotation of kind `A`
pub fn has_annotation<A: Annotation>(catalog: &TypeCatalog, member: &dyn AnnotatedMember) -> bool {
    get_annotation::<A>(catalog, member, true).is_some()
}
