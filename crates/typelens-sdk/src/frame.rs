//! Call frame and method body signature
//!
//! The invoker resolves a method by name, binds its generic parameters and
//! then hands the body a `CallFrame`. Bodies only see this frame; they never
//! depend on catalog internals.

use std::sync::Arc;

use crate::convert::FromValue;
use crate::error::{CallError, CallResult};
use crate::value::{Instance, TypeId, Value};

/// Everything a method body receives for one invocation
#[derive(Debug, Clone, Copy)]
pub struct CallFrame<'a> {
    /// Receiver for instance calls, `None` for static calls
    pub receiver: Option<&'a Instance>,
    /// Positional arguments
    pub args: &'a [Value],
    /// Concrete types bound to the method's generic parameters, in order
    pub type_args: &'a [TypeId],
}

impl<'a> CallFrame<'a> {
    /// Frame for a static, non-generic call
    pub fn new(args: &'a [Value]) -> Self {
        Self {
            receiver: None,
            args,
            type_args: &[],
        }
    }

    /// Set the receiver
    pub fn with_receiver(mut self, receiver: &'a Instance) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Set the bound generic type arguments
    pub fn with_type_args(mut self, type_args: &'a [TypeId]) -> Self {
        self.type_args = type_args;
        self
    }

    /// Raw argument at `index`
    pub fn value(&self, index: usize) -> CallResult<&'a Value> {
        self.args.get(index).ok_or_else(|| {
            CallError::ArgumentError(format!(
                "missing argument {} (got {} arguments)",
                index,
                self.args.len()
            ))
        })
    }

    /// Argument at `index`, converted to `T`
    pub fn arg<T: FromValue>(&self, index: usize) -> CallResult<T> {
        T::from_value(self.value(index)?)
    }

    /// Bound type argument at `index`
    pub fn type_arg(&self, index: usize) -> CallResult<TypeId> {
        self.type_args.get(index).copied().ok_or_else(|| {
            CallError::ArgumentError(format!("missing type argument {}", index))
        })
    }

    /// Receiver state downcast to `T`
    pub fn receiver<T: 'static>(&self) -> CallResult<&'a T> {
        let receiver = self
            .receiver
            .ok_or_else(|| CallError::ArgumentError("static call has no receiver".to_string()))?;
        receiver
            .downcast_ref::<T>()
            .ok_or_else(|| CallError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                got: format!("instance of {}", receiver.type_id()),
            })
    }
}

/// A method body (for symbolic name-based dispatch)
pub type MethodFn = Arc<dyn Fn(CallFrame<'_>) -> CallResult<Value> + Send + Sync>;
