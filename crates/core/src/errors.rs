//! Core error types for the relief mapping application.
//!
//! This module defines store-agnostic error types. Storage-specific errors
//! (from the Firestore REST client) are converted to these types by the
//! storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the relief mapping application.
///
/// Store-specific errors are wrapped in string form to keep this type
/// store-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Geospatial analysis failed: {0}")]
    Analysis(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Store-agnostic error type for document-store operations.
///
/// This enum uses `String` for all error details, allowing the storage
/// layer to convert client-specific errors (HTTP, REST API) into this
/// format.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to reach the document store at all.
    #[error("Failed to connect to document store: {0}")]
    Connection(String),

    /// The requested document was not found.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A document read failed.
    #[error("Document read failed: {0}")]
    ReadFailed(String),

    /// A document write failed.
    #[error("Document write failed: {0}")]
    WriteFailed(String),

    /// A document delete failed.
    #[error("Document delete failed: {0}")]
    DeleteFailed(String),

    /// The caller is not signed in, or lacks access to the document.
    #[error("Not authorized against document store: {0}")]
    Unauthorized(String),

    /// A document payload could not be converted to or from the store's
    /// wire representation.
    #[error("Document serialization failed: {0}")]
    Serialization(String),
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] chrono::ParseError),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
