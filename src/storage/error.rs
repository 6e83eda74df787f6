//! Storage layer error types
//!
//! All errors that can occur during storage operations are defined here
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::{CollectionName, DocumentId, InvalidNameError};

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// the requested document was not found
    #[error("document not found: collection={collection}, id={id}")]
    DocumentNotFound {
        collection: CollectionName,
        id: DocumentId,
    },

    /// the document already exists (duplicate id)
    #[error("document already exists: collection={collection}, id={id}")]
    DocumentAlreadyExists {
        collection: CollectionName,
        id: DocumentId,
    },

    /// invalid collection name or document id
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    /// the document body is not a JSON object
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// data integrity check failed
    #[error("corrupted data for document {id}: {reason}")]
    CorruptedData { id: DocumentId, reason: String },

    /// store directory is missing or was never initialized
    #[error("store not initialized: {0}")]
    NotInitialized(PathBuf),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
