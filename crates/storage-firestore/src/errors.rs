//! Storage-specific error types for Firestore REST operations.
//!
//! This module provides error types that wrap HTTP/API errors and
//! convert them to the store-agnostic error types defined in
//! `reliefmap_core`.

use reliefmap_core::errors::{Error, StoreError};
use thiserror::Error;

/// Storage-specific errors that wrap transport and API failures.
///
/// These errors are internal to the storage layer and are converted to
/// `reliefmap_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Value conversion error: {0}")]
    Value(String),
}

impl StorageError {
    /// Create an API error from status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

impl StorageError {
    /// Converts this error into the core store error for the given
    /// operation. The operation decides whether transport failures show
    /// up as read or write failures.
    pub fn into_store_error(self, operation: Operation) -> StoreError {
        match self {
            StorageError::Http(e) if e.is_connect() || e.is_timeout() => {
                StoreError::Connection(e.to_string())
            }
            StorageError::Api { status: 404, message } => StoreError::NotFound(message),
            StorageError::Api { status: 401 | 403, message } => StoreError::Unauthorized(message),
            StorageError::Json(e) => StoreError::Serialization(e.to_string()),
            StorageError::Value(e) => StoreError::Serialization(e),
            other => match operation {
                Operation::Read => StoreError::ReadFailed(other.to_string()),
                Operation::Write => StoreError::WriteFailed(other.to_string()),
                Operation::Delete => StoreError::DeleteFailed(other.to_string()),
            },
        }
    }
}

/// Which kind of store operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

/// Extension trait to convert storage results to core results.
///
/// The orphan rule prevents a direct `From<StorageError> for Error`
/// keyed by operation, so this trait carries the operation through.
pub trait IntoCoreResult<T> {
    fn into_core(self, operation: Operation) -> Result<T, Error>;
}

impl<T> IntoCoreResult<T> for Result<T, StorageError> {
    fn into_core(self, operation: Operation) -> Result<T, Error> {
        self.map_err(|err| Error::Store(err.into_store_error(operation)))
    }
}
