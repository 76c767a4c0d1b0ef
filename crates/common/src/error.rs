//! Error types for qaflow

use thiserror::Error;

use crate::stage::Stage;

/// Result type alias using qaflow Error
pub type Result<T> = std::result::Result<T, Error>;

/// qaflow error types
#[derive(Error, Debug)]
pub enum Error {
    /// A required input field was empty. Reported inline; no backend call is made.
    #[error("Please provide a {field}.")]
    Validation { field: &'static str },

    /// The request could not complete.
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend { stage: Stage, message: String },

    /// A downstream action was attempted before its input exists.
    #[error("{0}")]
    Precondition(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("{kind} cannot be exported as {format}")]
    UnsupportedExport { kind: String, format: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a backend error, substituting the stage fallback when the
    /// backend supplied no message.
    pub fn backend(stage: Stage, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| stage.failure_message().to_string());
        Error::Backend { stage, message }
    }

    /// Errors surfaced through the shared error banner.
    pub fn is_operation_error(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Backend { .. } | Error::Precondition(_)
        )
    }
}
