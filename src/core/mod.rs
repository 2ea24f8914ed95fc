/// Core Module for dbprimer
///
/// This module holds the database access layer and the shared error type.
/// Repositories and the CLI are built on top of it.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DbPrimerError, Result};
