//! Typelens SDK - Lightweight SDK for writing dynamically invocable methods
//!
//! This crate provides the minimal types and traits needed to write method
//! bodies that the typelens invoker can dispatch to, without depending on the
//! full catalog crate.
//!
//! # Example
//!
//! ```ignore
//! use typelens_sdk::{CallError, CallFrame, Value};
//!
//! fn echo(frame: CallFrame<'_>) -> Result<Value, CallError> {
//!     let n: i32 = frame.arg(0)?;
//!     Ok(Value::I32(n))
//! }
//! ```

#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod frame;
pub mod value;

pub use convert::{FromValue, ToValue};
pub use error::{CallError, CallResult};
pub use frame::{CallFrame, MethodFn};
pub use value::{Instance, TypeId, Value};
