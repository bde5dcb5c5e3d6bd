//! Error types for the resource store.

/// Errors that can occur when working with the resource index or blob store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry with this identifier already exists
    #[error("identifier already in use: {0}")]
    Conflict(String),

    /// No entry exists for this identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// Identifier is not usable as a storage key
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
