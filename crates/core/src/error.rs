//! Core Error Types
//!
//! Defines the foundational error types used across the Prompt Stash workspace.
//! These error types are dependency-free (only thiserror + serde_json) to keep the
//! core crate lightweight.
//!
//! The main application crate extends these with storage and import variants
//! (e.g., Sqlite, InvalidFormat, MalformedCollection).

use thiserror::Error;

/// Core error type for the Prompt Stash workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
