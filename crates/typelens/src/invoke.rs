//! Dynamic invocation by name
//!
//! Methods are registered with callable bodies when the catalog is built.
//! The invoker looks a method up by name, static-ness, argument count and
//! (optionally) generic arity, binds the supplied type arguments and calls
//! the body with a [`CallFrame`].
//!
//! Resolution walks the target type first, then its ancestors nearest first.
//! There is no overload ranking: the first structurally compatible method
//! wins, and a debug event is emitted when others would also have matched.

use std::panic::{self, AssertUnwindSafe};

use typelens_sdk::{CallError, CallFrame, Instance, ToValue, TypeId, Value};

use crate::catalog::{MemberDescriptor, TypeCatalog, TypeRef};
use crate::config::InvokeConfig;
use crate::error::InvokeError;
use crate::relations::is_subtype_or_same;

/// Receiver of an invocation
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Static call on a type
    Type(TypeId),
    /// Instance call on a live object
    Instance(&'a Instance),
}

impl Target<'_> {
    /// Type whose members are searched
    pub fn type_id(&self) -> TypeId {
        match self {
            Target::Type(id) => *id,
            Target::Instance(instance) => instance.type_id(),
        }
    }

    /// Whether static members are searched
    pub fn is_static(&self) -> bool {
        matches!(self, Target::Type(_))
    }
}

/// Name-based method invoker over a catalog
#[derive(Debug, Clone, Copy)]
pub struct Invoker<'c> {
    catalog: &'c TypeCatalog,
    config: InvokeConfig,
}

impl<'c> Invoker<'c> {
    /// Invoker with default behavior
    pub fn new(catalog: &'c TypeCatalog) -> Self {
        Self::with_config(catalog, InvokeConfig::default())
    }

    /// Invoker with explicit behavior
    pub fn with_config(catalog: &'c TypeCatalog, config: InvokeConfig) -> Self {
        Self { catalog, config }
    }

    /// Find the method a call would dispatch to.
    ///
    /// `generic_arity` of 0 matches methods of any generic arity.
    pub fn resolve(
        &self,
        ty: TypeId,
        name: &str,
        arity: usize,
        is_static: bool,
        generic_arity: usize,
    ) -> Option<&'c MemberDescriptor> {
        let catalog = self.catalog;
        let chain = catalog.hierarchy(ty);
        let depth = if self.config.search_ancestors { chain.len() } else { 1 };

        let mut candidates = chain
            .iter()
            .take(depth)
            .filter_map(|id| catalog.get(*id))
            .flat_map(|t| t.members.iter())
            .filter(|m| {
                m.name == name
                    && m.is_method()
                    && m.is_invocable()
                    && m.is_static() == is_static
                    && m.signature.arity() == arity
                    && (generic_arity == 0 || m.signature.generic_arity() == generic_arity)
            });

        let selected = candidates.next()?;
        let others = candidates.count();
        if others > 0 {
            tracing::debug!(
                method = name,
                target_type = catalog.name_of(ty),
                declared_in = catalog.name_of(selected.declaring_type),
                others,
                "ambiguous method resolution, taking the first match"
            );
        }
        Some(selected)
    }

    fn check_type_args(&self, member: &MemberDescriptor, method: &str, type_args: &[TypeId]) -> Result<(), InvokeError> {
        let signature = &member.signature;
        let reject = |reason: String| InvokeError::TypeResolution {
            method: method.to_string(),
            reason,
        };

        if signature.is_generic() && type_args.is_empty() {
            return Err(reject(format!(
                "generic method requires {} type argument(s)",
                signature.generic_arity()
            )));
        }
        if !self.config.check_constraints {
            return Ok(());
        }

        for (param, &arg) in signature.generic_params.iter().zip(type_args) {
            let Some(arg_ty) = self.catalog.get(arg) else {
                return Err(reject(format!("unknown type argument {} for {}", arg, param.name)));
            };
            let constraints = &param.constraints;
            if constraints.value_kind && !arg_ty.flags.is_value_kind {
                return Err(reject(format!(
                    "{} must be a value type, got {}",
                    param.name, arg_ty.name
                )));
            }
            if constraints.reference_kind && arg_ty.flags.is_value_kind {
                return Err(reject(format!(
                    "{} must be a reference type, got {}",
                    param.name, arg_ty.name
                )));
            }
            if let Some(bound) = constraints
                .bounds
                .iter()
                .find(|b| !is_subtype_or_same(self.catalog, arg, **b))
            {
                return Err(reject(format!(
                    "{} does not satisfy bound {} of {}",
                    arg_ty.name,
                    self.catalog.name_of(*bound),
                    param.name
                )));
            }
        }
        Ok(())
    }

    /// Invoke a method by name.
    ///
    /// Returns `Ok(None)` for void methods. Type arguments bind the
    /// method's generic parameters in order.
    pub fn invoke(
        &self,
        target: Target<'_>,
        name: &str,
        args: &[Value],
        type_args: &[TypeId],
    ) -> Result<Option<Value>, InvokeError> {
        let ty = target.type_id();
        let is_static = target.is_static();
        let member = self
            .resolve(ty, name, args.len(), is_static, type_args.len())
            .ok_or_else(|| InvokeError::MethodNotFound {
                type_name: self.catalog.name_of(ty).to_string(),
                method: name.to_string(),
                arity: args.len(),
                is_static,
            })?;

        let method = format!("{}.{}", self.catalog.name_of(member.declaring_type), name);
        self.check_type_args(member, &method, type_args)?;

        let Some(body) = member.body() else {
            return Err(InvokeError::MethodNotFound {
                type_name: self.catalog.name_of(ty).to_string(),
                method: name.to_string(),
                arity: args.len(),
                is_static,
            });
        };

        let mut frame = CallFrame::new(args).with_type_args(type_args);
        if let Target::Instance(instance) = target {
            frame = frame.with_receiver(instance);
        }

        tracing::trace!(method = %method, args = args.len(), type_args = type_args.len(), "invoking");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(frame)))
            .unwrap_or_else(|payload| Err(CallError::Panic(panic_message(&*payload))));

        match outcome {
            Ok(value) if returns_value(member) => Ok(Some(value)),
            Ok(_) => Ok(None),
            Err(source) => {
                tracing::debug!(method = %method, error = %source, "invocation failed");
                Err(InvokeError::InvocationFailure { method, source })
            }
        }
    }

    /// Invoke a non-generic static method
    pub fn invoke_static(&self, ty: TypeId, name: &str, args: &[Value]) -> Result<Option<Value>, InvokeError> {
        self.invoke(Target::Type(ty), name, args, &[])
    }

    /// Invoke a non-generic instance method
    pub fn invoke_method(
        &self,
        instance: &Instance,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, InvokeError> {
        self.invoke(Target::Instance(instance), name, args, &[])
    }

    /// Invoke a static method on the catalog type bound to `T`
    pub fn invoke_static_of<T: 'static>(
        &self,
        name: &str,
        args: &[Value],
        type_args: &[TypeId],
    ) -> Result<Option<Value>, InvokeError> {
        let ty = self.catalog.type_of::<T>().ok_or_else(|| InvokeError::MethodNotFound {
            type_name: std::any::type_name::<T>().to_string(),
            method: name.to_string(),
            arity: args.len(),
            is_static: true,
        })?;
        self.invoke(Target::Type(ty), name, args, type_args)
    }

    /// Invoke a single-argument static method
    pub fn invoke_static_with(
        &self,
        ty: TypeId,
        name: &str,
        arg: impl ToValue,
    ) -> Result<Option<Value>, InvokeError> {
        self.invoke_static(ty, name, &[arg.to_value()])
    }

    /// Invoke a single-argument instance method
    pub fn invoke_method_with(
        &self,
        instance: &Instance,
        name: &str,
        arg: impl ToValue,
    ) -> Result<Option<Value>, InvokeError> {
        self.invoke_method(instance, name, &[arg.to_value()])
    }
}

/// Invoke a method by name with default invoker behavior
pub fn invoke(
    catalog: &TypeCatalog,
    target: Target<'_>,
    name: &str,
    args: &[Value],
    type_args: &[TypeId],
) -> Result<Option<Value>, InvokeError> {
    Invoker::new(catalog).invoke(target, name, args, type_args)
}

fn returns_value(member: &MemberDescriptor) -> bool {
    !matches!(member.signature.return_type, None | Some(TypeRef::Type(TypeId::VOID)))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "method body panicked".to_string()
    }
}
