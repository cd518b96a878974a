use thiserror::Error;

use crate::DocumentId;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with the same `_id` already exists in the collection.
    #[error("Duplicate key in collection {collection}: {id}")]
    DuplicateKey { collection: String, id: DocumentId },

    /// The document is not a JSON object, or carries a malformed `_id`.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The store refused the operation because it is offline.
    #[error("Store unavailable: {operation} on {collection}")]
    Unavailable {
        operation: &'static str,
        collection: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
