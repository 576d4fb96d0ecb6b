//! Error types for the asset collections core

use thiserror::Error;
use crate::rules::ValidationError;

/// Main error type for collection operations
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Collection with the given ID does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Item with the given ID is not part of the collection
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Rule set failed validation and was not stored
    #[error("Invalid rules: {}", .errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "))]
    InvalidRules {
        /// Hard validation errors that blocked the update
        errors: Vec<ValidationError>,
    },

    /// A sync is already running for this collection
    #[error("Sync already in progress: {0}")]
    SyncInProgress(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// State blob could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<rusqlite::Error> for CollectionError {
    fn from(err: rusqlite::Error) -> Self {
        CollectionError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::SerializationError(err.to_string())
    }
}

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CollectionError>;
