use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vms_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Visitor name cannot be empty")]
    EmptyName,
    #[error("Visitor ID cannot be empty")]
    EmptyVisitorId,
    #[error("Search term cannot be empty")]
    EmptySearchTerm,
    #[error("Visitor not found for id/prefix: {0}")]
    VisitorNotFound(String),
    #[error("{0}")]
    AmbiguousVisitorId(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}
