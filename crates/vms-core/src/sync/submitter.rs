//! Optimistic local write followed by a background push.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::diagnostics::DiagnosticLog;
use crate::error::Result;
use crate::models::Visitor;
use crate::remote::{RecordWriter, SnapshotSource, SyncError, WriteChannel};
use crate::store::LocalStore;
use crate::util::unix_millis_now;

use super::engine::CycleOutcome;
use super::scheduler::SyncScheduler;

/// What happened to one record after the local write.
#[derive(Debug)]
pub struct PushReport {
    pub result: std::result::Result<WriteChannel, SyncError>,
    /// Outcome of the follow-up silent cycle, run only after a successful push
    pub follow_up: Option<CycleOutcome>,
}

/// Writes records locally, then pushes them to the remote store.
pub struct MutationSubmitter<S, W> {
    store: Arc<LocalStore>,
    writer: Arc<W>,
    scheduler: SyncScheduler<S>,
    log: DiagnosticLog,
}

impl<S, W> Clone for MutationSubmitter<S, W> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            writer: Arc::clone(&self.writer),
            scheduler: self.scheduler.clone(),
            log: self.log.clone(),
        }
    }
}

impl<S, W> MutationSubmitter<S, W>
where
    S: SnapshotSource + 'static,
    W: RecordWriter + 'static,
{
    pub fn new(
        store: Arc<LocalStore>,
        writer: W,
        scheduler: SyncScheduler<S>,
        log: DiagnosticLog,
    ) -> Self {
        Self {
            store,
            writer: Arc::new(writer),
            scheduler,
            log,
        }
    }

    /// Mark `visitor` dirty, put it first in the local list and persist, then
    /// push it in the background.
    ///
    /// The local write is never reverted. A successful push is followed by the
    /// delayed silent cycle; a failed one is only logged and left to the
    /// regular cadence. The handle resolves once both have finished.
    pub async fn submit(&self, visitor: Visitor) -> Result<JoinHandle<PushReport>> {
        self.store
            .upsert_dirty(visitor.clone(), unix_millis_now())
            .await?;

        let writer = Arc::clone(&self.writer);
        let scheduler = self.scheduler.clone();
        let log = self.log.clone();
        Ok(tokio::spawn(async move {
            let result = writer.submit(&visitor).await;
            let follow_up = match &result {
                Ok(channel) => {
                    log.append(format!("Saved {} via {channel}.", visitor.name));
                    match scheduler.follow_up().await {
                        Ok(outcome) => Some(outcome),
                        Err(error) => {
                            log.append(format!("Follow-up sync failed: {error}"));
                            None
                        }
                    }
                }
                Err(error) => {
                    log.append(format!("Write failed for {}: {error}", visitor.name));
                    None
                }
            };
            PushReport { result, follow_up }
        }))
    }
}
