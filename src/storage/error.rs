//! Storage error types
//!
//! Defines all errors that can occur while reading or rewriting a JSON
//! document. None of these escape the public store contract; they are
//! logged and mapped to `false` / empty results at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the document stores
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document exists but could not be parsed
    #[error("Corrupt document {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
