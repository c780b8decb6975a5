//! Error types for vms-core

use thiserror::Error;

use crate::remote::SyncError;

/// Result type alias using vms-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vms-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Visitor not found
    #[error("Visitor not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote sheet fetch or write failure
    #[error(transparent)]
    Sync(#[from] SyncError),
}
