//! Derived type discovery
//!
//! Scans a scope of the catalog for types assignable to a base type. The
//! default scope is the home module of the base type. Constructed types
//! (array types, generic instantiations and generic parameter placeholders)
//! are never reported; only declared types are.

use std::collections::BTreeSet;

use typelens_sdk::TypeId;

use crate::catalog::{ModuleId, TypeCatalog, TypeDescriptor};
use crate::config::DerivedConfig;
use crate::relations::is_subtype_or_same;

/// Part of the catalog a derived type query looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A single module
    Module(ModuleId),
    /// Several modules
    Modules(Vec<ModuleId>),
    /// Every module
    Catalog,
}

impl Scope {
    /// Whether `module` is part of this scope
    pub fn contains(&self, module: ModuleId) -> bool {
        match self {
            Scope::Module(m) => *m == module,
            Scope::Modules(ms) => ms.contains(&module),
            Scope::Catalog => true,
        }
    }
}

/// Query for the types derived from a base type
#[derive(Debug, Clone)]
pub struct DerivedTypeQuery {
    base: TypeId,
    scope: Option<Scope>,
    include_self: bool,
    include_abstract: bool,
}

impl DerivedTypeQuery {
    /// Query with default options: home module scope, no self, no abstract types
    pub fn new(base: TypeId) -> Self {
        Self {
            base,
            scope: None,
            include_self: false,
            include_abstract: false,
        }
    }

    /// Query seeded from configured defaults
    pub fn with_config(base: TypeId, config: &DerivedConfig) -> Self {
        Self {
            include_self: config.include_self,
            include_abstract: config.include_abstract,
            ..Self::new(base)
        }
    }

    /// Restrict (or widen) the scanned scope
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Include the base type itself when it qualifies
    pub fn include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }

    /// Include abstract types
    pub fn include_abstract(mut self, include: bool) -> Self {
        self.include_abstract = include;
        self
    }

    fn accepts(&self, catalog: &TypeCatalog, candidate: &TypeDescriptor) -> bool {
        !candidate.is_constructed()
            && (self.include_self || candidate.id != self.base)
            && (self.include_abstract || !candidate.is_abstract())
            && is_subtype_or_same(catalog, candidate.id, self.base)
    }

    /// Run the query. An unknown base type yields an empty set
    pub fn run(&self, catalog: &TypeCatalog) -> BTreeSet<TypeId> {
        let Some(base) = catalog.get(self.base) else {
            return BTreeSet::new();
        };
        let home = Scope::Module(base.module);
        let scope = self.scope.as_ref().unwrap_or(&home);

        let found: BTreeSet<TypeId> = catalog
            .iter()
            .filter(|t| scope.contains(t.module))
            .filter(|t| self.accepts(catalog, t))
            .map(|t| t.id)
            .collect();

        tracing::trace!(base = %base.name, found = found.len(), "derived type scan");
        found
    }
}

/// Find all types assignable to `base`.
///
/// `scope` defaults to the home module of `base`.
pub fn find_derived_types(
    catalog: &TypeCatalog,
    base: TypeId,
    scope: Option<Scope>,
    include_self: bool,
    include_abstract: bool,
) -> BTreeSet<TypeId> {
    let mut query = DerivedTypeQuery::new(base)
        .include_self(include_self)
        .include_abstract(include_abstract);
    if let Some(scope) = scope {
        query = query.in_scope(scope);
    }
    query.run(catalog)
}

/// Find all types assignable to the catalog type bound to `T`.
///
/// Empty if `T` is not bound in the catalog.
pub fn find_derived_types_of<T: 'static>(
    catalog: &TypeCatalog,
    scope: Option<Scope>,
    include_self: bool,
    include_abstract: bool,
) -> BTreeSet<TypeId> {
    match catalog.type_of::<T>() {
        Some(base) => find_derived_types(catalog, base, scope, include_self, include_abstract),
        None => BTreeSet::new(),
    }
}
