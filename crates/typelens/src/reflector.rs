//! Facade combining a catalog with configured defaults

use std::collections::BTreeSet;
use std::sync::Arc;

use typelens_sdk::{Instance, TypeId, Value};

use crate::annotations::{self, AnnotatedMember, Annotation};
use crate::catalog::{self, TypeCatalog};
use crate::config::ReflectConfig;
use crate::derived::DerivedTypeQuery;
use crate::error::InvokeError;
use crate::invoke::{Invoker, Target};
use crate::navigator;
use crate::relations;

/// Entry point for every introspection and invocation operation
#[derive(Debug, Clone)]
pub struct Reflector {
    catalog: Arc<TypeCatalog>,
    config: ReflectConfig,
}

impl Reflector {
    /// Reflector with default configuration
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self::with_config(catalog, ReflectConfig::default())
    }

    /// Reflector with explicit configuration
    pub fn with_config(catalog: Arc<TypeCatalog>, config: ReflectConfig) -> Self {
        Self { catalog, config }
    }

    /// Reflector over the process-wide catalog, if one was installed
    pub fn global() -> Option<Self> {
        catalog::global().map(Self::new)
    }

    /// Underlying catalog
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Active configuration
    pub fn config(&self) -> &ReflectConfig {
        &self.config
    }

    /// See [`navigator::resolve_element_type`]
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        navigator::resolve_element_type(&self.catalog, ty)
    }

    /// See [`navigator::resolve_generic_arguments`]
    pub fn generic_arguments(&self, ty: TypeId) -> Option<&[TypeId]> {
        navigator::resolve_generic_arguments(&self.catalog, ty)
    }

    /// Derived type query seeded with the configured defaults
    pub fn derived_query(&self, base: TypeId) -> DerivedTypeQuery {
        DerivedTypeQuery::with_config(base, &self.config.derived)
    }

    /// Types derived from `base` in its home module, using configured defaults
    pub fn derived_types(&self, base: TypeId) -> BTreeSet<TypeId> {
        self.derived_query(base).run(&self.catalog)
    }

    /// See [`relations::is_subtype_or_same`]
    pub fn is_subtype_or_same(&self, derived: TypeId, base: TypeId) -> bool {
        relations::is_subtype_or_same(&self.catalog, derived, base)
    }

    /// See [`relations::instance_is`]
    pub fn instance_is(&self, base: TypeId, instance: &Instance) -> bool {
        relations::instance_is(&self.catalog, base, instance)
    }

    /// First annotation of kind `A`, honoring the configured inherit flag
    pub fn annotation<'a, A: Annotation>(&'a self, member: &'a dyn AnnotatedMember) -> Option<&'a A> {
        annotations::get_annotation(&self.catalog, member, self.config.annotations.inherit)
    }

    /// All annotations of kind `A`, honoring the configured inherit flag
    pub fn annotations<'a, A: Annotation>(&'a self, member: &'a dyn AnnotatedMember) -> Vec<&'a A> {
        annotations::get_annotations(&self.catalog, member, self.config.annotations.inherit)
    }

    /// See [`annotations::has_annotation`]
    pub fn has_annotation<A: Annotation>(&self, member: &dyn AnnotatedMember) -> bool {
        annotations::has_annotation::<A>(&self.catalog, member)
    }

    /// Invoker using the configured behavior
    pub fn invoker(&self) -> Invoker<'_> {
        Invoker::with_config(&self.catalog, self.config.invoke)
    }

    /// See [`Invoker::invoke`]
    pub fn invoke(
        &self,
        target: Target<'_>,
        name: &str,
        args: &[Value],
        type_args: &[TypeId],
    ) -> Result<Option<Value>, InvokeError> {
        self.invoker().invoke(target, name, args, type_args)
    }
}
