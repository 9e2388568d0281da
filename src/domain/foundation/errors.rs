//! Error types shared across the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    #[error("field '{field}' must be positive, got {actual}")]
    NotPositive { field: &'static str, actual: i64 },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: &'static str) -> Self {
        ValidationError::EmptyField { field }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }
}

/// Persistence failure reported by a repository implementation.
///
/// Repositories translate their backend errors (sqlx, poisoned locks)
/// into this opaque form so the application layer stays storage-agnostic.
#[derive(Debug, Clone, Error)]
#[error("storage error: {0}")]
pub struct StorageError(String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
