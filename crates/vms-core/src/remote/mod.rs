//! Remote spreadsheet access: snapshot reads and best-effort record writes.
//!
//! [`SnapshotSource`] and [`RecordWriter`] are the seams the sync engine and
//! the mutation submitter depend on; [`SheetClient`] implements both over
//! HTTP.

mod fetch;
mod rows;
mod submit;

use std::fmt;
use std::future::Future;

use thiserror::Error;

use crate::models::Visitor;

pub use fetch::{process_snapshot_text, SheetClient, MIN_SNAPSHOT_LEN};
pub use rows::visitor_from_row;
pub use submit::{form_fields, WriteChannel};

/// Failure class of a sync error, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// Sync is not configured
    Configuration,
    /// Snapshot text is unusable
    Parse,
    /// Transport failure or error status
    Network,
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "configuration",
            Self::Parse => "parse",
            Self::Network => "network",
        })
    }
}

/// Errors from fetching a snapshot or writing a record.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Missing sheet id")]
    MissingSheetId,

    #[error("No write channel configured (set an Apps Script URL or a form id)")]
    NoWriteChannel,

    #[error("Sheet is not published as CSV")]
    NotPublished,

    #[error("Snapshot response was empty or truncated")]
    EmptyResponse,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned HTTP {0}")]
    Status(u16),
}

impl SyncError {
    #[must_use]
    pub const fn kind(&self) -> SyncErrorKind {
        match self {
            Self::MissingSheetId | Self::NoWriteChannel => SyncErrorKind::Configuration,
            Self::NotPublished | Self::EmptyResponse => SyncErrorKind::Parse,
            Self::Http(_) | Self::Status(_) => SyncErrorKind::Network,
        }
    }
}

/// Source of raw snapshot text.
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current snapshot; `now_ms` is the cycle instant.
    fn fetch_snapshot(
        &self,
        now_ms: i64,
    ) -> impl Future<Output = Result<String, SyncError>> + Send;
}

/// Channel pushing a single created or edited record to the remote store.
pub trait RecordWriter: Send + Sync {
    fn submit(
        &self,
        visitor: &Visitor,
    ) -> impl Future<Output = Result<WriteChannel, SyncError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_follow_taxonomy() {
        assert_eq!(SyncError::MissingSheetId.kind(), SyncErrorKind::Configuration);
        assert_eq!(SyncError::NoWriteChannel.kind(), SyncErrorKind::Configuration);
        assert_eq!(SyncError::NotPublished.kind(), SyncErrorKind::Parse);
        assert_eq!(SyncError::EmptyResponse.kind(), SyncErrorKind::Parse);
        assert_eq!(SyncError::Status(503).kind(), SyncErrorKind::Network);
        assert_eq!(SyncErrorKind::Network.to_string(), "network");
    }
}
