//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Snippet evaluation failed
    #[error("Evaluation of `{snippet}` failed: {source}")]
    Evaluation {
        /// The snippet that failed
        snippet: String,
        /// Underlying stub error
        #[source]
        source: playstub::StubError,
    },

    /// Playstub library error
    #[error("Playstub error: {0}")]
    Stub(#[from] playstub::StubError),

    /// Logging could not be initialised
    #[error("Logging setup failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create an evaluation error for a snippet
    #[must_use]
    pub fn evaluation(snippet: impl Into<String>, source: playstub::StubError) -> Self {
        Self::Evaluation {
            snippet: snippet.into(),
            source,
        }
    }

    /// Create a logging error
    #[must_use]
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}
