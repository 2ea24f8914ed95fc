/// dbprimer Error Module
///
/// This module defines the error type shared by every database operation.
/// Driver errors are carried verbatim; the only classification added on top
/// is whether the connection, a statement, or a lookup failed.
use thiserror::Error;

/// Error type for dbprimer.
///
/// The variants cover:
/// - Opening a connection (missing location, refused access mode)
/// - Executing statements (syntax errors, constraint violations)
/// - Lookups that matched no row
/// - Configuration loading and file system access
#[derive(Error, Debug)]
pub enum DbPrimerError {
    /// The database could not be opened or configured
    #[error("Connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A statement failed to prepare, bind or execute
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// A lookup by key matched no row
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbPrimerError {
    /// Builds a `NotFound` for the given entity name and key.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DbPrimerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbPrimerError::NotFound { .. })
    }
}

/// Type alias for Result to use DbPrimerError as the error type.
pub type Result<T> = std::result::Result<T, DbPrimerError>;
