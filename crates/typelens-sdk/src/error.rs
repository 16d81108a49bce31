//! Error types for method bodies

/// Result type returned by method bodies
pub type CallResult<T> = Result<T, CallError>;

/// Errors raised by a method body during invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// Type mismatch during argument or receiver conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Method body panicked
    #[error("Method panicked: {0}")]
    Panic(String),

    /// Method body reported a failure
    #[error("{0}")]
    Failed(String),
}

impl From<String> for CallError {
    fn from(s: String) -> Self {
        CallError::Failed(s)
    }
}

impl From<&str> for CallError {
    fn from(s: &str) -> Self {
        CallError::Failed(s.to_string())
    }
}
