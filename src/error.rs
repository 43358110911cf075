//! Structured error types for store operations.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller supplied a value the store refuses to persist.
    InvalidInput,
    /// The underlying storage medium failed or is unreachable.
    StorageFailure,
}

/// Errors surfaced by the local store.
///
/// Nothing is retried internally; every failure reaches the immediate caller.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl StoreError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageFailure(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::InvalidInput { .. } => ErrorCode::InvalidInput,
            StoreError::StorageFailure(_) => ErrorCode::StorageFailure,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.code() == ErrorCode::InvalidInput
    }

    pub fn is_storage_failure(&self) -> bool {
        self.code() == ErrorCode::StorageFailure
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::storage(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::storage(err)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::StorageFailure(format!("storage task did not complete: {}", err))
    }
}

/// Error payload written by the CLI in JSON mode.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl From<&StoreError> for ErrorReport {
    fn from(err: &StoreError) -> Self {
        let field = match err {
            StoreError::InvalidInput { field, .. } => Some(*field),
            StoreError::StorageFailure(_) => None,
        };
        Self {
            code: err.code(),
            message: err.to_string(),
            field,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
