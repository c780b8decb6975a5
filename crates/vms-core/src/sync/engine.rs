//! One sync cycle: fetch, process, merge.

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::DiagnosticLog;
use crate::error::Result;
use crate::models::Visitor;
use crate::remote::{process_snapshot_text, SnapshotSource, SyncError, SyncErrorKind};
use crate::store::LocalStore;
use crate::util::unix_millis_now;

/// What a cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Snapshot merged; counts of remote records and resulting canonical list
    Merged { remote: usize, canonical: usize },
    /// Snapshot held no records; local list left untouched
    EmptySnapshot,
    /// Another cycle was in flight
    Skipped,
    /// Fetch or processing failed; local list left untouched
    Failed(SyncErrorKind, String),
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged { remote, canonical } => {
                write!(f, "merged {remote} remote rows into {canonical} records")
            }
            Self::EmptySnapshot => f.write_str("snapshot empty, local records kept"),
            Self::Skipped => f.write_str("skipped, another sync is running"),
            Self::Failed(kind, message) => write!(f, "failed ({kind}): {message}"),
        }
    }
}

/// Fetch-and-merge driver over a snapshot source and the local store.
pub struct SyncEngine<S> {
    store: Arc<LocalStore>,
    source: S,
    log: DiagnosticLog,
}

impl<S: SnapshotSource> SyncEngine<S> {
    pub const fn new(store: Arc<LocalStore>, source: S, log: DiagnosticLog) -> Self {
        Self { store, source, log }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Run one cycle without any gating.
    ///
    /// Sync failures are reported in the outcome; only local store failures
    /// are returned as errors.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let now_ms = unix_millis_now();
        let text = match self.source.fetch_snapshot(now_ms).await {
            Ok(text) => text,
            Err(error) => return Ok(self.failed(&error)),
        };
        self.log.record_raw_response(&text);
        self.merge_text(&text, now_ms).await
    }

    /// Merge pasted CSV text exactly as a fetched snapshot would be merged.
    pub async fn import_csv(&self, text: &str) -> Result<CycleOutcome> {
        self.log.append("Processing manual CSV import");
        self.merge_text(text, unix_millis_now()).await
    }

    async fn merge_text(&self, text: &str, now_ms: i64) -> Result<CycleOutcome> {
        let remote = match process_snapshot_text(text, now_ms) {
            Ok(remote) => remote,
            Err(error) => return Ok(self.failed(&error)),
        };
        self.merge_records(&remote, now_ms).await
    }

    async fn merge_records(&self, remote: &[Visitor], now_ms: i64) -> Result<CycleOutcome> {
        if remote.is_empty() {
            self.log.append("Snapshot had no entries; keeping local records");
            return Ok(CycleOutcome::EmptySnapshot);
        }

        self.log.append(format!("Fetched {} entries.", remote.len()));
        let summary = self.store.merge_remote(remote, now_ms).await?;
        tracing::debug!(
            "Merge stats: hidden={}, pending={}, shadowed={}, dirty_expired={}",
            summary.stats.remote_hidden,
            summary.stats.pending_local,
            summary.stats.remote_shadowed,
            summary.stats.dirty_expired
        );

        Ok(CycleOutcome::Merged {
            remote: summary.remote,
            canonical: summary.canonical,
        })
    }

    fn failed(&self, error: &SyncError) -> CycleOutcome {
        self.log.append(format!("Sync error: {error}"));
        CycleOutcome::Failed(error.kind(), error.to_string())
    }
}
