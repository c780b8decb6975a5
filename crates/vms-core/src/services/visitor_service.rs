//! Operator-facing service tying the store, sync scheduler and submitter together.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::analytics::RegisterStats;
use crate::diagnostics::DiagnosticLog;
use crate::error::{Error, Result};
use crate::models::{check_in_timestamp_now, Visitor, VisitorDraft, VisitorId};
use crate::print_queue::{LabelFields, PrintQueue};
use crate::remote::{RecordWriter, SnapshotSource};
use crate::search::filter_visitors;
use crate::store::LocalStore;
use crate::sync::{
    CycleKind, CycleOutcome, MutationSubmitter, PushReport, SyncEngine, SyncScheduler,
};

/// A record written locally and the handle of its background push.
#[derive(Debug)]
pub struct Submission {
    pub visitor: Visitor,
    pub push: JoinHandle<PushReport>,
}

/// Thread-safe service for register operations.
pub struct VisitorService<S, W> {
    store: Arc<LocalStore>,
    scheduler: SyncScheduler<S>,
    submitter: MutationSubmitter<S, W>,
    log: DiagnosticLog,
}

impl<S, W> Clone for VisitorService<S, W> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scheduler: self.scheduler.clone(),
            submitter: self.submitter.clone(),
            log: self.log.clone(),
        }
    }
}

impl<S, W> VisitorService<S, W>
where
    S: SnapshotSource + 'static,
    W: RecordWriter + 'static,
{
    pub fn new(store: Arc<LocalStore>, source: S, writer: W, log: DiagnosticLog) -> Self {
        let engine = SyncEngine::new(Arc::clone(&store), source, log.clone());
        let scheduler = SyncScheduler::new(engine);
        let submitter =
            MutationSubmitter::new(Arc::clone(&store), writer, scheduler.clone(), log.clone());
        Self {
            store,
            scheduler,
            submitter,
            log,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    #[must_use]
    pub const fn scheduler(&self) -> &SyncScheduler<S> {
        &self.scheduler
    }

    #[must_use]
    pub const fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Check a visitor in, or save an edit of `editing`.
    ///
    /// Edits keep the record's id and original check-in instant; new records
    /// get an unconfirmed local id and the current instant.
    pub async fn check_in(
        &self,
        draft: VisitorDraft,
        editing: Option<&VisitorId>,
    ) -> Result<Submission> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("Visitor name must not be empty".to_string()));
        }

        let (id, checked_in_at) = match editing {
            Some(id) => {
                let existing = self
                    .store
                    .find(id)
                    .await
                    .ok_or_else(|| Error::NotFound(id.to_string()))?;
                (existing.id, existing.checked_in_at)
            }
            None => (VisitorId::new_local(), check_in_timestamp_now()),
        };

        let visitor = draft.into_visitor(id, checked_in_at);
        tracing::info!("Checking in {} as {}", visitor.name, visitor.id);
        let push = self.submitter.submit(visitor.clone()).await?;
        Ok(Submission { visitor, push })
    }

    /// Hide a record locally; it never comes back from the sheet.
    pub async fn hide(&self, id: &VisitorId) -> Result<bool> {
        let removed = self.store.hide(id).await?;
        self.log.append(format!("Record {id} hidden"));
        Ok(removed)
    }

    pub async fn check_out(&self, id: &VisitorId) -> Result<Visitor> {
        self.store.check_out(id).await
    }

    pub async fn list(&self) -> Vec<Visitor> {
        self.store.current().await
    }

    pub async fn search(&self, term: &str) -> Vec<Visitor> {
        let visitors = self.store.current().await;
        filter_visitors(&visitors, term).into_iter().cloned().collect()
    }

    pub async fn stats(&self) -> RegisterStats {
        RegisterStats::from_visitors(&self.store.current().await)
    }

    /// Explicit operator-requested sync cycle.
    pub async fn sync_now(&self) -> Result<CycleOutcome> {
        self.scheduler.request(CycleKind::Explicit).await
    }

    pub async fn import_csv(&self, text: &str) -> Result<CycleOutcome> {
        self.scheduler.engine().import_csv(text).await
    }

    pub async fn queue_add(&self, id: VisitorId) -> Result<bool> {
        let mut queue = self.store.print_queue().await?;
        let added = queue.add(id);
        self.store.save_print_queue(&queue).await?;
        Ok(added)
    }

    pub async fn queue_remove(&self, id: &VisitorId) -> Result<bool> {
        let mut queue = self.store.print_queue().await?;
        let removed = queue.remove(id);
        self.store.save_print_queue(&queue).await?;
        Ok(removed)
    }

    pub async fn queue_clear(&self) -> Result<()> {
        self.store.save_print_queue(&PrintQueue::default()).await
    }

    /// Label data for every queued record still in the register.
    pub async fn queue_labels(&self) -> Result<Vec<(VisitorId, LabelFields)>> {
        let queue = self.store.print_queue().await?;
        let visitors = self.store.current().await;
        Ok(queue
            .resolve(&visitors)
            .into_iter()
            .map(|visitor| (visitor.id.clone(), LabelFields::from_visitor(visitor)))
            .collect())
    }
}
