//! Dynamic values passed to and returned from invoked methods
//!
//! `Value` is the argument/return currency of the invoker. Primitive values
//! are stored inline; strings are shared (`Arc<str>`); objects are passed as
//! [`Instance`] handles that carry their runtime catalog type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifier of a type in a type catalog.
///
/// Ids are dense indices assigned in registration order. The first few ids
/// are reserved for the builtin types every catalog starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// Root of every class hierarchy that does not declare another base
    pub const OBJECT: TypeId = TypeId(0);
    /// Return type marker for methods that produce no value
    pub const VOID: TypeId = TypeId(1);
    /// Boolean primitive
    pub const BOOL: TypeId = TypeId(2);
    /// 32-bit integer primitive
    pub const I32: TypeId = TypeId(3);
    /// 64-bit integer primitive
    pub const I64: TypeId = TypeId(4);
    /// 64-bit float primitive
    pub const F64: TypeId = TypeId(5);
    /// String type
    pub const STRING: TypeId = TypeId(6);

    /// Number of reserved builtin ids
    pub const BUILTIN_COUNT: u32 = 7;

    /// Create from a raw index
    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    /// Raw index of this id
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Whether this id refers to one of the reserved builtin types
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live object with a runtime catalog type.
///
/// Cloning an `Instance` clones the handle, not the state. State that
/// methods need to mutate must use interior mutability.
#[derive(Clone)]
pub struct Instance {
    type_id: TypeId,
    state: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap `state` as an instance of the catalog type `type_id`
    pub fn new<T: Any + Send + Sync>(type_id: TypeId, state: T) -> Self {
        Self {
            type_id,
            state: Arc::new(state),
        }
    }

    /// Instance with no state, useful for types whose methods are stateless
    pub fn unit(type_id: TypeId) -> Self {
        Self::new(type_id, ())
    }

    /// Runtime type of this instance
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Borrow the state as `T`, if that is its concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    /// Check whether two handles share the same state
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// Dynamic value handed to and returned from invoked methods
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 64-bit float
    F64(f64),
    /// Shared immutable string
    Str(Arc<str>),
    /// A type, passed as a first-class value
    Type(TypeId),
    /// Ordered list of values
    List(Vec<Value>),
    /// Object instance
    Object(Instance),
}

impl Value {
    /// Create a string value
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Check if this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32 if this is an i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64; i32 values widen
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            Value::I32(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    /// Get as f64 if this is an f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// Get as a type id
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(t) => Some(*t),
            _ => None,
        }
    }

    /// Get as a list of values
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get as an object instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the value's variant, used in error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Type(_) => "type",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Type(t) => write!(f, "type {}", t),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => write!(f, "object {}", obj.type_id()),
        }
    }
}
