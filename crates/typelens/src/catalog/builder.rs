//! Catalog construction
//!
//! Types are registered through [`CatalogBuilder::define`], which assigns the
//! id immediately so later definitions can refer to it. Base types, members
//! and capabilities may be added after the fact; everything is validated once
//! in [`CatalogBuilder::build`].
//!
//! Generic definitions get one `GenericParameter` placeholder type per
//! parameter. Closed instantiations are created with
//! [`CatalogBuilder::instantiate`] and receive their base, capabilities and
//! members at build time by substituting the bound arguments into the
//! definition.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use typelens_sdk::{CallFrame, CallResult, MethodFn, TypeId, Value};

use super::descriptor::{TypeDescriptor, TypeFlags, TypeKind};
use super::member::{GenericParam, MemberDescriptor, MemberKind, ParameterInfo, Signature, TypeRef};
use super::{ModuleId, ModuleInfo, TypeCatalog};
use crate::annotations::{Annotation, AnnotationInstance};
use crate::error::CatalogError;

/// Maximum number of generic instantiations expanded by one build
pub const INSTANTIATION_LIMIT: usize = 1024;

/// Definition for a field or property
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Member name
    pub name: String,
    /// Value type
    pub ty: TypeRef,
    /// Field or property
    pub kind: MemberKind,
    /// Whether this is a static member
    pub is_static: bool,
    /// Annotations
    pub annotations: Vec<AnnotationInstance>,
}

impl FieldDefinition {
    /// Create a field definition
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Field,
            is_static: false,
            annotations: Vec::new(),
        }
    }

    /// Create a property definition
    pub fn property(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            kind: MemberKind::Property,
            ..Self::new(name, ty)
        }
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach an annotation
    pub fn annotate<A: Annotation>(mut self, annotation: A) -> Self {
        self.annotations.push(AnnotationInstance::new(annotation));
        self
    }
}

/// Definition for a method with a callable body
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameter names and types
    pub parameters: Vec<(String, TypeRef)>,
    /// Return type, `None` for void
    pub return_type: Option<TypeRef>,
    /// Whether this is a static method
    pub is_static: bool,
    /// Generic parameters of the method
    pub generic_params: Vec<GenericParam>,
    /// Annotations
    pub annotations: Vec<AnnotationInstance>,
    body: MethodFn,
}

impl MethodDefinition {
    /// Create a void instance method backed by `body`
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(CallFrame<'_>) -> CallResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            is_static: false,
            generic_params: Vec::new(),
            annotations: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.parameters.push((name.into(), ty.into()));
        self
    }

    /// Set return type
    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Mark as static method
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add a generic parameter
    pub fn generic_param(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    /// Attach an annotation
    pub fn annotate<A: Annotation>(mut self, annotation: A) -> Self {
        self.annotations.push(AnnotationInstance::new(annotation));
        self
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .field("is_static", &self.is_static)
            .field("generic_params", &self.generic_params)
            .finish_non_exhaustive()
    }
}

/// Any member definition
#[derive(Debug, Clone)]
pub enum MemberDefinition {
    /// Field or property
    Field(FieldDefinition),
    /// Method
    Method(MethodDefinition),
}

impl From<FieldDefinition> for MemberDefinition {
    fn from(def: FieldDefinition) -> Self {
        MemberDefinition::Field(def)
    }
}

impl From<MethodDefinition> for MemberDefinition {
    fn from(def: MethodDefinition) -> Self {
        MemberDefinition::Method(def)
    }
}

impl MemberDefinition {
    fn into_descriptor(self, declaring_type: TypeId) -> MemberDescriptor {
        match self {
            MemberDefinition::Field(def) => MemberDescriptor {
                name: def.name,
                kind: def.kind,
                declaring_type,
                signature: Signature {
                    return_type: Some(def.ty),
                    is_static: def.is_static,
                    ..Signature::default()
                },
                annotations: def.annotations,
                body: None,
            },
            MemberDefinition::Method(def) => MemberDescriptor {
                name: def.name,
                kind: MemberKind::Method,
                declaring_type,
                signature: Signature {
                    parameters: def
                        .parameters
                        .into_iter()
                        .enumerate()
                        .map(|(index, (name, ty))| ParameterInfo { name, ty, index })
                        .collect(),
                    return_type: def.return_type,
                    is_static: def.is_static,
                    generic_params: def.generic_params,
                },
                annotations: def.annotations,
                body: Some(def.body),
            },
        }
    }
}

/// Definition of a new type
#[derive(Debug)]
pub struct TypeDefinition {
    name: String,
    module: ModuleId,
    kind: TypeKind,
    flags: TypeFlags,
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
    generic_params: Vec<String>,
    annotations: Vec<AnnotationInstance>,
    members: Vec<MemberDefinition>,
    rust_type: Option<(std::any::TypeId, &'static str)>,
}

impl TypeDefinition {
    fn with_kind(name: impl Into<String>, module: ModuleId, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            module,
            kind,
            flags: TypeFlags::for_kind(kind),
            base: if kind == TypeKind::Interface { None } else { Some(TypeId::OBJECT) },
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            rust_type: None,
        }
    }

    /// A class deriving from `object` unless [`extends`](Self::extends) is called
    pub fn class(name: impl Into<String>, module: ModuleId) -> Self {
        Self::with_kind(name, module, TypeKind::Class)
    }

    /// An interface (abstract, no base type)
    pub fn interface(name: impl Into<String>, module: ModuleId) -> Self {
        Self::with_kind(name, module, TypeKind::Interface)
    }

    /// A user-defined value type
    pub fn structure(name: impl Into<String>, module: ModuleId) -> Self {
        Self::with_kind(name, module, TypeKind::Struct)
    }

    /// An enumeration
    pub fn enumeration(name: impl Into<String>, module: ModuleId) -> Self {
        Self::with_kind(name, module, TypeKind::Enum)
    }

    /// Set the base type
    pub fn extends(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare a capability
    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Mark as abstract
    pub fn as_abstract(mut self) -> Self {
        self.flags.is_abstract = true;
        self
    }

    /// Mark as sealed
    pub fn as_sealed(mut self) -> Self {
        self.flags.is_sealed = true;
        self
    }

    /// Declare a generic parameter
    pub fn generic_param(mut self, name: impl Into<String>) -> Self {
        self.generic_params.push(name.into());
        self
    }

    /// Attach an annotation
    pub fn annotate<A: Annotation>(mut self, annotation: A) -> Self {
        self.annotations.push(AnnotationInstance::new(annotation));
        self
    }

    /// Add a field or property
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.members.push(field.into());
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.members.push(method.into());
        self
    }

    /// Bind the Rust type `T` to this catalog type
    pub fn bind<T: 'static>(mut self) -> Self {
        self.rust_type = Some((std::any::TypeId::of::<T>(), std::any::type_name::<T>()));
        self
    }
}

/// Builder for a [`TypeCatalog`]
#[derive(Debug)]
pub struct CatalogBuilder {
    types: Vec<TypeDescriptor>,
    modules: Vec<ModuleInfo>,
    qualified: FxHashMap<(ModuleId, String), TypeId>,
    rust_types: FxHashMap<std::any::TypeId, TypeId>,
    instantiations: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    arrays: FxHashMap<TypeId, TypeId>,
    pending: Vec<TypeId>,
}

impl CatalogBuilder {
    /// Create a builder holding the `core` module and the builtin types
    pub fn new() -> Self {
        let mut builder = Self {
            types: Vec::new(),
            modules: vec![ModuleInfo {
                id: ModuleId::CORE,
                name: "core".to_string(),
            }],
            qualified: FxHashMap::default(),
            rust_types: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            arrays: FxHashMap::default(),
            pending: Vec::new(),
        };

        // Order must match the reserved TypeId constants
        builder.register_builtin("object", TypeKind::Class, None);
        builder.register_builtin("void", TypeKind::Primitive, None);
        builder.register_builtin("bool", TypeKind::Primitive, Some(TypeId::OBJECT));
        builder.register_builtin("i32", TypeKind::Primitive, Some(TypeId::OBJECT));
        builder.register_builtin("i64", TypeKind::Primitive, Some(TypeId::OBJECT));
        builder.register_builtin("f64", TypeKind::Primitive, Some(TypeId::OBJECT));
        let string = builder.register_builtin("string", TypeKind::Class, Some(TypeId::OBJECT));
        builder.types[string.index()].flags.is_sealed = true;

        builder.bind_builtin::<bool>(TypeId::BOOL);
        builder.bind_builtin::<i32>(TypeId::I32);
        builder.bind_builtin::<i64>(TypeId::I64);
        builder.bind_builtin::<f64>(TypeId::F64);
        builder.bind_builtin::<String>(TypeId::STRING);
        builder
    }

    fn register_builtin(&mut self, name: &str, kind: TypeKind, base: Option<TypeId>) -> TypeId {
        let id = self.push_type(name.to_string(), ModuleId::CORE, kind);
        self.types[id.index()].base = base;
        self.qualified.insert((ModuleId::CORE, name.to_string()), id);
        id
    }

    fn bind_builtin<T: 'static>(&mut self, id: TypeId) {
        self.rust_types.insert(std::any::TypeId::of::<T>(), id);
        self.types[id.index()].rust_type = Some(std::any::TypeId::of::<T>());
    }

    fn push_type(&mut self, name: String, module: ModuleId, kind: TypeKind) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(TypeDescriptor::new(id, name, module, kind));
        id
    }

    fn descriptor_mut(&mut self, id: TypeId) -> Result<&mut TypeDescriptor, CatalogError> {
        self.types
            .get_mut(id.index())
            .ok_or(CatalogError::UnknownType(id))
    }

    fn module_name(&self, module: ModuleId) -> String {
        self.modules
            .get(module.index())
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("<module {}>", module.index()))
    }

    /// Get or create the module called `name`
    pub fn module(&mut self, name: &str) -> ModuleId {
        if let Some(existing) = self.modules.iter().find(|m| m.name == name) {
            return existing.id;
        }
        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.push(ModuleInfo {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Register a type and return its id
    pub fn define(&mut self, def: TypeDefinition) -> Result<TypeId, CatalogError> {
        let key = (def.module, def.name.clone());
        if self.qualified.contains_key(&key) {
            return Err(CatalogError::DuplicateType {
                name: def.name,
                module: self.module_name(def.module),
            });
        }
        if let Some((rust_id, rust_name)) = def.rust_type {
            if let Some(existing) = self.rust_types.get(&rust_id) {
                return Err(CatalogError::DuplicateRustBinding {
                    rust_name: rust_name.to_string(),
                    type_name: self.types[existing.index()].name.clone(),
                });
            }
        }

        let id = self.push_type(def.name, def.module, def.kind);
        let params: Vec<TypeId> = def
            .generic_params
            .into_iter()
            .map(|name| self.push_type(name, def.module, TypeKind::GenericParameter))
            .collect();

        let ty = &mut self.types[id.index()];
        ty.flags = def.flags;
        ty.base = def.base;
        ty.interfaces = def.interfaces;
        ty.generic_arguments = params;
        ty.annotations = def.annotations;
        ty.members = def
            .members
            .into_iter()
            .map(|m| m.into_descriptor(id))
            .collect();
        if let Some((rust_id, _)) = def.rust_type {
            ty.rust_type = Some(rust_id);
            self.rust_types.insert(rust_id, id);
        }
        self.qualified.insert(key, id);

        tracing::trace!(type_id = id.as_u32(), "defined type");
        Ok(id)
    }

    /// Placeholder types of a generic definition (empty for non-generic types)
    pub fn generic_params(&self, ty: TypeId) -> &[TypeId] {
        match self.types.get(ty.index()) {
            Some(desc) if desc.generic_definition.is_none() => &desc.generic_arguments,
            _ => &[],
        }
    }

    /// Add a member to an already defined type
    pub fn add_member(
        &mut self,
        ty: TypeId,
        member: impl Into<MemberDefinition>,
    ) -> Result<(), CatalogError> {
        let desc = self.descriptor_mut(ty)?;
        if desc.generic_definition.is_some() {
            let member = member.into();
            let name = match &member {
                MemberDefinition::Field(f) => f.name.clone(),
                MemberDefinition::Method(m) => m.name.clone(),
            };
            return Err(CatalogError::InvalidMember {
                type_name: desc.name.clone(),
                member: name,
                reason: "members of an instantiation come from its generic definition".to_string(),
            });
        }
        desc.members.push(member.into().into_descriptor(ty));
        Ok(())
    }

    /// Set (or replace) the base type of an already defined type
    pub fn set_base(&mut self, ty: TypeId, base: TypeId) -> Result<(), CatalogError> {
        self.descriptor_mut(ty)?.base = Some(base);
        Ok(())
    }

    /// Declare a capability on an already defined type
    pub fn implement(&mut self, ty: TypeId, interface: TypeId) -> Result<(), CatalogError> {
        self.descriptor_mut(ty)?.interfaces.push(interface);
        Ok(())
    }

    /// Attach an annotation to an already defined type
    pub fn annotate<A: Annotation>(&mut self, ty: TypeId, annotation: A) -> Result<(), CatalogError> {
        self.descriptor_mut(ty)?
            .annotations
            .push(AnnotationInstance::new(annotation));
        Ok(())
    }

    /// Bind the Rust type `T` to an existing catalog type (e.g. an instantiation)
    pub fn bind<T: 'static>(&mut self, ty: TypeId) -> Result<(), CatalogError> {
        let rust_id = std::any::TypeId::of::<T>();
        if let Some(existing) = self.rust_types.get(&rust_id) {
            return Err(CatalogError::DuplicateRustBinding {
                rust_name: std::any::type_name::<T>().to_string(),
                type_name: self.types[existing.index()].name.clone(),
            });
        }
        self.descriptor_mut(ty)?.rust_type = Some(rust_id);
        self.rust_types.insert(rust_id, ty);
        Ok(())
    }

    /// Close a generic definition over `args`. Repeated calls with the same
    /// arguments return the same id
    pub fn instantiate(&mut self, definition: TypeId, args: &[TypeId]) -> Result<TypeId, CatalogError> {
        let def = self
            .types
            .get(definition.index())
            .ok_or(CatalogError::UnknownType(definition))?;
        let expected = if def.is_generic_definition() {
            def.generic_arguments.len()
        } else {
            0
        };
        if expected == 0 || args.len() != expected {
            return Err(CatalogError::GenericArity {
                definition: def.name.clone(),
                expected,
                actual: args.len(),
            });
        }
        if let Some(missing) = args.iter().find(|a| a.index() >= self.types.len()) {
            return Err(CatalogError::UnknownType(*missing));
        }

        let key = (definition, args.to_vec());
        if let Some(&existing) = self.instantiations.get(&key) {
            return Ok(existing);
        }

        let arg_names: Vec<&str> = args
            .iter()
            .map(|a| self.types[a.index()].name.as_str())
            .collect();
        let name = format!("{}<{}>", def.name, arg_names.join(", "));
        let (module, kind, flags) = (def.module, def.kind, def.flags);

        let id = self.push_type(name, module, kind);
        let ty = &mut self.types[id.index()];
        ty.flags = flags;
        ty.generic_arguments = args.to_vec();
        ty.generic_definition = Some(definition);
        self.instantiations.insert(key, id);
        self.pending.push(id);
        Ok(id)
    }

    /// Array type with element `element`, shared by all callers
    pub fn array_of(&mut self, element: TypeId) -> Result<TypeId, CatalogError> {
        let elem = self
            .types
            .get(element.index())
            .ok_or(CatalogError::UnknownType(element))?;
        if let Some(&existing) = self.arrays.get(&element) {
            return Ok(existing);
        }

        let name = format!("{}[]", elem.name);
        let module = elem.module;
        let id = self.push_type(name, module, TypeKind::Array);
        let ty = &mut self.types[id.index()];
        ty.base = Some(TypeId::OBJECT);
        ty.element_type = Some(element);
        self.arrays.insert(element, id);
        Ok(id)
    }

    fn substitute(&mut self, ty: TypeId, map: &FxHashMap<TypeId, TypeId>) -> Result<TypeId, CatalogError> {
        if let Some(&bound) = map.get(&ty) {
            return Ok(bound);
        }
        let (definition, args, element) = match self.types.get(ty.index()) {
            Some(desc) => (desc.generic_definition, desc.generic_arguments.clone(), desc.element_type),
            None => return Ok(ty),
        };

        if let Some(definition) = definition {
            let mut bound = Vec::with_capacity(args.len());
            for arg in &args {
                bound.push(self.substitute(*arg, map)?);
            }
            if bound != args {
                return self.instantiate(definition, &bound);
            }
        } else if let Some(element) = element {
            let bound = self.substitute(element, map)?;
            if bound != element {
                return self.array_of(bound);
            }
        }
        Ok(ty)
    }

    fn substitute_ref(&mut self, ty: TypeRef, map: &FxHashMap<TypeId, TypeId>) -> Result<TypeRef, CatalogError> {
        match ty {
            TypeRef::Type(id) => Ok(TypeRef::Type(self.substitute(id, map)?)),
            method_param => Ok(method_param),
        }
    }

    fn substitute_member(
        &mut self,
        mut member: MemberDescriptor,
        declaring_type: TypeId,
        map: &FxHashMap<TypeId, TypeId>,
    ) -> Result<MemberDescriptor, CatalogError> {
        member.declaring_type = declaring_type;
        for param in &mut member.signature.parameters {
            param.ty = self.substitute_ref(param.ty, map)?;
        }
        if let Some(ret) = member.signature.return_type {
            member.signature.return_type = Some(self.substitute_ref(ret, map)?);
        }
        for generic in &mut member.signature.generic_params {
            for bound in &mut generic.constraints.bounds {
                *bound = self.substitute(*bound, map)?;
            }
        }
        Ok(member)
    }

    fn expand_instantiations(&mut self) -> Result<(), CatalogError> {
        let mut expanded = 0usize;
        while let Some(id) = self.pending.pop() {
            expanded += 1;
            if expanded > INSTANTIATION_LIMIT {
                return Err(CatalogError::InstantiationLimit {
                    type_name: self.types[id.index()].name.clone(),
                    limit: INSTANTIATION_LIMIT,
                });
            }

            let inst = &self.types[id.index()];
            let Some(definition) = inst.generic_definition else {
                continue;
            };
            let def = &self.types[definition.index()];
            let map: FxHashMap<TypeId, TypeId> = def
                .generic_arguments
                .iter()
                .copied()
                .zip(inst.generic_arguments.iter().copied())
                .collect();
            let base = def.base;
            let interfaces = def.interfaces.clone();
            let members = def.members.clone();
            let annotations = def.annotations.clone();

            let base = match base {
                Some(b) => Some(self.substitute(b, &map)?),
                None => None,
            };
            let mut bound_interfaces = Vec::with_capacity(interfaces.len());
            for interface in interfaces {
                bound_interfaces.push(self.substitute(interface, &map)?);
            }
            let mut bound_members = Vec::with_capacity(members.len());
            for member in members {
                bound_members.push(self.substitute_member(member, id, &map)?);
            }

            let ty = &mut self.types[id.index()];
            ty.base = base;
            ty.interfaces = bound_interfaces;
            ty.members = bound_members;
            ty.annotations = annotations;
        }
        Ok(())
    }

    fn check_exists(&self, id: TypeId) -> Result<&TypeDescriptor, CatalogError> {
        self.types.get(id.index()).ok_or(CatalogError::UnknownType(id))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for ty in &self.types {
            if let Some(base) = ty.base {
                let base_desc = self.check_exists(base)?;
                let rejected = ty.is_interface()
                    || base_desc.is_interface()
                    || base_desc.flags.is_sealed
                    || base_desc.kind == TypeKind::GenericParameter;
                if rejected {
                    return Err(CatalogError::InvalidBase {
                        type_name: ty.name.clone(),
                        base_name: base_desc.name.clone(),
                    });
                }
            }

            for &capability in &ty.interfaces {
                let cap = self.check_exists(capability)?;
                if !cap.is_interface() {
                    return Err(CatalogError::NotAnInterface {
                        type_name: ty.name.clone(),
                        capability_name: cap.name.clone(),
                    });
                }
            }

            for &arg in &ty.generic_arguments {
                self.check_exists(arg)?;
            }
            if let Some(element) = ty.element_type {
                self.check_exists(element)?;
            }

            for member in &ty.members {
                for referenced in member.signature.referenced_types() {
                    self.check_exists(referenced)?;
                }
                let arity = member.signature.generic_arity();
                let refs = member
                    .signature
                    .parameters
                    .iter()
                    .map(|p| p.ty)
                    .chain(member.signature.return_type);
                for r in refs {
                    if let TypeRef::MethodParam(index) = r {
                        if index >= arity {
                            return Err(CatalogError::InvalidMember {
                                type_name: ty.name.clone(),
                                member: member.name.clone(),
                                reason: format!(
                                    "method generic parameter {} out of range ({} declared)",
                                    index, arity
                                ),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn hierarchies(&self) -> Result<Vec<Box<[TypeId]>>, CatalogError> {
        let limit = self.types.len();
        self.types
            .iter()
            .map(|ty| {
                let mut chain = vec![ty.id];
                let mut current = ty.base;
                while let Some(id) = current {
                    if chain.len() > limit {
                        return Err(CatalogError::CyclicInheritance {
                            type_name: ty.name.clone(),
                        });
                    }
                    chain.push(id);
                    current = self.types[id.index()].base;
                }
                Ok(chain.into_boxed_slice())
            })
            .collect()
    }

    /// Direct capabilities plus everything they inherit, excluding base types
    fn interface_closure(
        &self,
        id: TypeId,
        closure: &mut [Option<FxHashSet<TypeId>>],
        visiting: &mut [bool],
    ) -> Result<(), CatalogError> {
        if closure[id.index()].is_some() {
            return Ok(());
        }
        if visiting[id.index()] {
            return Err(CatalogError::CyclicInheritance {
                type_name: self.types[id.index()].name.clone(),
            });
        }
        visiting[id.index()] = true;

        let mut set = FxHashSet::default();
        for &capability in &self.types[id.index()].interfaces {
            self.interface_closure(capability, closure, visiting)?;
            set.insert(capability);
            set.extend(closure[capability.index()].iter().flatten().copied());
        }

        visiting[id.index()] = false;
        closure[id.index()] = Some(set);
        Ok(())
    }

    fn capabilities(&self, hierarchies: &[Box<[TypeId]>]) -> Result<Vec<FxHashSet<TypeId>>, CatalogError> {
        let n = self.types.len();
        let mut closure: Vec<Option<FxHashSet<TypeId>>> = vec![None; n];
        let mut visiting = vec![false; n];
        for ty in &self.types {
            self.interface_closure(ty.id, &mut closure, &mut visiting)?;
        }

        Ok(hierarchies
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .flat_map(|ancestor| closure[ancestor.index()].iter().flatten().copied())
                    .collect()
            })
            .collect())
    }

    /// Expand instantiations, validate every reference and precompute
    /// hierarchies and capability sets
    pub fn build(mut self) -> Result<TypeCatalog, CatalogError> {
        self.expand_instantiations()?;
        self.validate()?;
        let hierarchies = self.hierarchies()?;
        let capabilities = self.capabilities(&hierarchies)?;

        let mut name_to_id = FxHashMap::default();
        for ty in &self.types {
            if ty.kind != TypeKind::GenericParameter {
                name_to_id.entry(ty.name.clone()).or_insert(ty.id);
            }
        }

        tracing::debug!(
            types = self.types.len(),
            modules = self.modules.len(),
            instantiations = self.instantiations.len(),
            arrays = self.arrays.len(),
            "built type catalog"
        );

        Ok(TypeCatalog {
            types: self.types,
            modules: self.modules,
            name_to_id,
            rust_types: self.rust_types,
            hierarchies,
            capabilities,
        })
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> MethodDefinition {
        MethodDefinition::new("Echo", |frame| frame.value(0).cloned())
            .param("value", TypeRef::MethodParam(0))
            .returns(TypeRef::MethodParam(0))
            .generic_param(GenericParam::new("T"))
    }

    #[test]
    fn test_define_and_build() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        assert_eq!(builder.module("app"), m);

        let shape = builder.define(TypeDefinition::class("Shape", m).as_abstract()).unwrap();
        let circle = builder
            .define(
                TypeDefinition::class("Circle", m)
                    .extends(shape)
                    .field(FieldDefinition::new("radius", TypeId::F64))
                    .field(FieldDefinition::property("Area", TypeId::F64)),
            )
            .unwrap();
        let catalog = builder.build().unwrap();

        let desc = catalog.get(circle).unwrap();
        assert_eq!(desc.base, Some(shape));
        assert_eq!(desc.fields().count(), 1);
        assert_eq!(desc.properties().count(), 1);
        assert_eq!(desc.members[0].declaring_type, circle);
        assert_eq!(catalog.hierarchy(circle), &[circle, shape, TypeId::OBJECT]);
        assert!(catalog.get(shape).unwrap().is_abstract());
    }

    #[test]
    fn test_duplicate_type() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        builder.define(TypeDefinition::class("A", m)).unwrap();
        let err = builder.define(TypeDefinition::class("A", m)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateType {
                name: "A".to_string(),
                module: "app".to_string()
            }
        );

        // Same name in another module is fine
        let other = builder.module("other");
        assert!(builder.define(TypeDefinition::class("A", other)).is_ok());
    }

    #[test]
    fn test_duplicate_rust_binding() {
        struct Thing;
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        builder.define(TypeDefinition::class("A", m).bind::<Thing>()).unwrap();
        let err = builder.define(TypeDefinition::class("B", m).bind::<Thing>()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRustBinding { ref type_name, .. } if type_name == "A"));
    }

    #[test]
    fn test_cyclic_base_chain() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let a = builder.define(TypeDefinition::class("A", m)).unwrap();
        let b = builder.define(TypeDefinition::class("B", m).extends(a)).unwrap();
        builder.set_base(a, b).unwrap();

        assert!(matches!(
            builder.build(),
            Err(CatalogError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn test_cyclic_interfaces() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let a = builder.define(TypeDefinition::interface("IA", m)).unwrap();
        let b = builder.define(TypeDefinition::interface("IB", m).implements(a)).unwrap();
        builder.implement(a, b).unwrap();

        assert!(matches!(
            builder.build(),
            Err(CatalogError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        builder
            .define(TypeDefinition::class("A", m).extends(TypeId::new(500)))
            .unwrap();
        assert_eq!(builder.build().unwrap_err(), CatalogError::UnknownType(TypeId::new(500)));

        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        builder
            .define(TypeDefinition::class("A", m).field(FieldDefinition::new("x", TypeId::new(77))))
            .unwrap();
        assert_eq!(builder.build().unwrap_err(), CatalogError::UnknownType(TypeId::new(77)));
    }

    #[test]
    fn test_invalid_base_and_capability() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let iface = builder.define(TypeDefinition::interface("IThing", m)).unwrap();
        builder.define(TypeDefinition::class("A", m).extends(iface)).unwrap();
        assert!(matches!(builder.build(), Err(CatalogError::InvalidBase { .. })));

        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let point = builder.define(TypeDefinition::structure("Point", m)).unwrap();
        builder.define(TypeDefinition::class("P3", m).extends(point)).unwrap();
        assert!(matches!(builder.build(), Err(CatalogError::InvalidBase { .. })));

        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let class = builder.define(TypeDefinition::class("A", m)).unwrap();
        builder.define(TypeDefinition::class("B", m).implements(class)).unwrap();
        assert_eq!(
            builder.build().unwrap_err(),
            CatalogError::NotAnInterface {
                type_name: "B".to_string(),
                capability_name: "A".to_string()
            }
        );
    }

    #[test]
    fn test_method_param_out_of_range() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let bad = MethodDefinition::new("Bad", |_| Ok(Value::Null)).param("x", TypeRef::MethodParam(1));
        builder.define(TypeDefinition::class("A", m).method(bad)).unwrap();
        assert!(matches!(builder.build(), Err(CatalogError::InvalidMember { .. })));
    }

    #[test]
    fn test_generic_arity() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let map = builder
            .define(TypeDefinition::class("Map", m).generic_param("K").generic_param("V"))
            .unwrap();
        let plain = builder.define(TypeDefinition::class("Plain", m)).unwrap();

        assert_eq!(
            builder.instantiate(map, &[TypeId::I32]).unwrap_err(),
            CatalogError::GenericArity {
                definition: "Map".to_string(),
                expected: 2,
                actual: 1
            }
        );
        assert!(matches!(
            builder.instantiate(plain, &[TypeId::I32]),
            Err(CatalogError::GenericArity { expected: 0, .. })
        ));
        assert_eq!(
            builder.instantiate(map, &[TypeId::I32, TypeId::new(900)]).unwrap_err(),
            CatalogError::UnknownType(TypeId::new(900))
        );
    }

    #[test]
    fn test_instantiation_substitutes_members() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let list = builder.define(TypeDefinition::class("List", m).generic_param("T")).unwrap();
        let t = builder.generic_params(list)[0];
        builder
            .add_member(list, FieldDefinition::new("first", t))
            .unwrap();
        builder.add_member(list, echo()).unwrap();

        let ints = builder.instantiate(list, &[TypeId::I32]).unwrap();
        assert_eq!(builder.instantiate(list, &[TypeId::I32]).unwrap(), ints);
        let catalog = builder.build().unwrap();

        let desc = catalog.get(ints).unwrap();
        assert_eq!(desc.name, "List<i32>");
        assert_eq!(desc.generic_definition, Some(list));
        assert_eq!(desc.generic_arguments, vec![TypeId::I32]);
        assert_eq!(desc.base, Some(TypeId::OBJECT));
        let first = desc.member("first").unwrap();
        assert_eq!(first.signature.return_type, Some(TypeRef::Type(TypeId::I32)));
        assert_eq!(first.declaring_type, ints);
        // Method-level parameters are left for the invoker to bind
        let echo = desc.member("Echo").unwrap();
        assert_eq!(echo.signature.return_type, Some(TypeRef::MethodParam(0)));
        assert!(echo.is_invocable());
        assert_eq!(catalog.get(t).unwrap().kind, TypeKind::GenericParameter);
    }

    #[test]
    fn test_generic_base_is_expanded() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let list = builder.define(TypeDefinition::class("List", m).generic_param("T")).unwrap();
        let sorted = builder.define(TypeDefinition::class("SortedList", m).generic_param("T")).unwrap();
        let t = builder.generic_params(sorted)[0];
        let list_of_t = builder.instantiate(list, &[t]).unwrap();
        builder.set_base(sorted, list_of_t).unwrap();

        let sorted_strings = builder.instantiate(sorted, &[TypeId::STRING]).unwrap();
        let catalog = builder.build().unwrap();

        let base = catalog.get(sorted_strings).unwrap().base.unwrap();
        assert_eq!(catalog.name_of(base), "List<string>");
        assert_eq!(catalog.get(base).unwrap().generic_arguments, vec![TypeId::STRING]);
    }

    #[test]
    fn test_array_types() {
        let mut builder = CatalogBuilder::new();
        let ints = builder.array_of(TypeId::I32).unwrap();
        assert_eq!(builder.array_of(TypeId::I32).unwrap(), ints);
        let nested = builder.array_of(ints).unwrap();
        let catalog = builder.build().unwrap();

        assert_eq!(catalog.name_of(ints), "i32[]");
        assert_eq!(catalog.name_of(nested), "i32[][]");
        assert_eq!(catalog.get(nested).unwrap().element_type, Some(ints));
        assert!(catalog.get(ints).unwrap().is_array());
    }

    #[test]
    fn test_runaway_instantiation() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let grow = builder.define(TypeDefinition::class("Grow", m).generic_param("T")).unwrap();
        let t = builder.generic_params(grow)[0];
        let grow_t = builder.instantiate(grow, &[t]).unwrap();
        let grow_grow_t = builder.instantiate(grow, &[grow_t]).unwrap();
        builder.set_base(grow, grow_grow_t).unwrap();

        assert!(matches!(
            builder.build(),
            Err(CatalogError::InstantiationLimit { limit: INSTANTIATION_LIMIT, .. })
        ));
    }

    #[test]
    fn test_capabilities_are_transitive() {
        let mut builder = CatalogBuilder::new();
        let m = builder.module("app");
        let readable = builder.define(TypeDefinition::interface("IReadable", m)).unwrap();
        let stream = builder
            .define(TypeDefinition::interface("IStream", m).implements(readable))
            .unwrap();
        let file = builder.define(TypeDefinition::class("File", m).implements(stream)).unwrap();
        let log_file = builder.define(TypeDefinition::class("LogFile", m).extends(file)).unwrap();
        let catalog = builder.build().unwrap();

        assert!(catalog.implements(log_file, readable));
        assert!(catalog.implements(log_file, stream));
        assert!(catalog.implements(stream, readable));
        assert!(!catalog.implements(readable, readable));
        assert_eq!(catalog.capabilities(log_file).count(), 2);
    }
}
