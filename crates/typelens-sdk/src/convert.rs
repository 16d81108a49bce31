//! Traits for converting between dynamic `Value`s and Rust types.
//!
//! Method bodies receive `&[Value]` and usually want concrete Rust types.
//! `FromValue` extracts them (failing with `CallError::TypeMismatch`) and
//! `ToValue` wraps a Rust result back into a `Value`.

use std::sync::Arc;

use crate::error::{CallError, CallResult};
use crate::value::{Instance, TypeId, Value};

/// Convert from `Value` to a Rust type.
///
/// Implement this trait to allow your type to be received as an argument.
pub trait FromValue: Sized {
    /// Convert from a `Value`, returning an error if the type doesn't match.
    fn from_value(value: &Value) -> CallResult<Self>;
}

/// Convert from a Rust type to `Value`.
///
/// Implement this trait to allow your type to be returned from a method.
pub trait ToValue {
    /// Convert to `Value`.
    fn to_value(self) -> Value;
}

fn mismatch(expected: &str, value: &Value) -> CallError {
    CallError::TypeMismatch {
        expected: expected.to_string(),
        got: value.type_name().to_string(),
    }
}

// ============================================================================
// Primitive Type Implementations
// ============================================================================

impl FromValue for bool {
    fn from_value(value: &Value) -> CallResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> CallResult<Self> {
        value.as_i32().ok_or_else(|| mismatch("i32", value))
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::I32(self)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> CallResult<Self> {
        value.as_i64().ok_or_else(|| mismatch("i64", value))
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::I64(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> CallResult<Self> {
        value.as_f64().ok_or_else(|| mismatch("f64", value))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::F64(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> CallResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Str(Arc::from(self))
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Str(Arc::from(self))
    }
}

impl FromValue for TypeId {
    fn from_value(value: &Value) -> CallResult<Self> {
        value.as_type().ok_or_else(|| mismatch("type", value))
    }
}

impl ToValue for TypeId {
    fn to_value(self) -> Value {
        Value::Type(self)
    }
}

impl FromValue for Instance {
    fn from_value(value: &Value) -> CallResult<Self> {
        value
            .as_instance()
            .cloned()
            .ok_or_else(|| mismatch("object", value))
    }
}

impl ToValue for Instance {
    fn to_value(self) -> Value {
        Value::Object(self)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> CallResult<Self> {
        Ok(value.clone())
    }
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

// Unit type (for methods that return void)
impl ToValue for () {
    fn to_value(self) -> Value {
        Value::Null
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> CallResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> CallResult<Self> {
        value
            .as_list()
            .ok_or_else(|| mismatch("list", value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}
