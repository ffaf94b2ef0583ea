//! Result and error types for playstub.

use thiserror::Error;

/// Result type for playstub operations
pub type StubResult<T> = Result<T, StubError>;

/// Errors that can occur while driving the stub page
#[derive(Debug, Error)]
pub enum StubError {
    /// No snippet form matched the expression
    #[error("Unsupported expression: {expression}")]
    UnsupportedExpression {
        /// The rejected snippet
        expression: String,
    },

    /// Polling predicate never became true
    #[error("Operation timed out after {ms}ms: {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of what was waited for
        waited_for: String,
    },

    /// Path traversal hit a key that does not exist
    #[error("Missing key in test state: {key}")]
    MissingKey {
        /// The missing key
        key: String,
    },

    /// A value had the wrong shape for the requested operation
    #[error("Type mismatch: {message}")]
    TypeMismatch {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StubError {
    /// Create an unsupported expression error
    #[must_use]
    pub fn unsupported(expression: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expression: expression.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(ms: u64, waited_for: impl Into<String>) -> Self {
        Self::Timeout {
            ms,
            waited_for: waited_for.into(),
        }
    }

    /// Create a missing key error
    #[must_use]
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create a type mismatch error
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Whether this error came from an expired wait
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
