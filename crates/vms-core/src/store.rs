//! Process-wide local register: records, hidden ids and dirty index.
//!
//! Loaded once when opened. Every mutation computes a complete new state,
//! persists it with [`StateRepository::replace_all`] and only then swaps it in,
//! so a failed write never leaves the in-memory view ahead of the database.

use std::path::Path;

use tokio::sync::Mutex;

use crate::db::{Database, LibSqlStateRepository, StateRepository};
use crate::error::{Error, Result};
use crate::models::{Visitor, VisitorId, VisitorStatus};
use crate::print_queue::PrintQueue;
use crate::reconcile::{reconcile, DirtyIndex, HiddenIds, ReconcileStats};

/// The three persisted structures, always written together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    pub visitors: Vec<Visitor>,
    pub hidden: HiddenIds,
    pub dirty: DirtyIndex,
}

impl LocalState {
    #[must_use]
    pub fn find(&self, id: &VisitorId) -> Option<&Visitor> {
        self.visitors.iter().find(|visitor| &visitor.id == id)
    }
}

/// Summary of a merge applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub remote: usize,
    pub canonical: usize,
    pub stats: ReconcileStats,
}

struct Inner {
    db: Database,
    state: LocalState,
}

/// Single-writer local store shared by the mutation and merge paths.
pub struct LocalStore {
    inner: Mutex<Inner>,
}

impl LocalStore {
    /// Open the store backed by the database at `path` and load its state.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::open(path).await?;
        Self::load(db).await
    }

    /// Open an in-memory store (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Self::load(db).await
    }

    /// Load persisted state from an open database.
    pub async fn load(db: Database) -> Result<Self> {
        let state = LibSqlStateRepository::new(db.connection())
            .load_state()
            .await?;
        tracing::debug!(
            "Loaded {} visitors, {} hidden, {} dirty",
            state.visitors.len(),
            state.hidden.len(),
            state.dirty.len()
        );
        Ok(Self {
            inner: Mutex::new(Inner { db, state }),
        })
    }

    /// Snapshot of the whole state.
    pub async fn snapshot(&self) -> LocalState {
        self.inner.lock().await.state.clone()
    }

    /// Current canonical record list.
    pub async fn current(&self) -> Vec<Visitor> {
        self.inner.lock().await.state.visitors.clone()
    }

    pub async fn find(&self, id: &VisitorId) -> Option<Visitor> {
        self.inner.lock().await.state.find(id).cloned()
    }

    /// Persist `state` and make it current.
    pub async fn replace_all(&self, state: LocalState) -> Result<()> {
        let mut inner = self.inner.lock().await;
        Self::commit(&mut inner, state).await
    }

    /// Merge a non-empty remote snapshot against the state as of this call.
    ///
    /// The lock is held from reading the local list through the swap, so a
    /// concurrent mutation lands either entirely before or entirely after.
    pub async fn merge_remote(&self, remote: &[Visitor], now_ms: i64) -> Result<MergeSummary> {
        let mut inner = self.inner.lock().await;
        let merged = reconcile(
            &inner.state.visitors,
            remote,
            &inner.state.hidden,
            &inner.state.dirty,
            now_ms,
        );
        let summary = MergeSummary {
            remote: remote.len(),
            canonical: merged.visitors.len(),
            stats: merged.stats,
        };
        let next = LocalState {
            visitors: merged.visitors,
            hidden: inner.state.hidden.clone(),
            dirty: merged.dirty,
        };
        Self::commit(&mut inner, next).await?;
        Ok(summary)
    }

    /// Put `visitor` at the front of the list, replacing any record with the
    /// same id, and mark it dirty at `now_ms`.
    pub async fn upsert_dirty(&self, visitor: Visitor, now_ms: i64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let mut next = inner.state.clone();
        next.dirty.mark(visitor.id.clone(), now_ms);
        next.visitors.retain(|existing| existing.id != visitor.id);
        next.visitors.insert(0, visitor);
        Self::commit(&mut inner, next).await
    }

    /// Tombstone `id` and drop it from the list. Returns whether a record was
    /// removed; hiding an unknown id still records the tombstone.
    pub async fn hide(&self, id: &VisitorId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let mut next = inner.state.clone();
        next.hidden.insert(id.clone());
        let before = next.visitors.len();
        next.visitors.retain(|visitor| &visitor.id != id);
        let removed = next.visitors.len() != before;
        Self::commit(&mut inner, next).await?;
        Ok(removed)
    }

    /// Mark a record checked out locally. Not pushed remotely and not dirty.
    pub async fn check_out(&self, id: &VisitorId) -> Result<Visitor> {
        let mut inner = self.inner.lock().await;
        let mut next = inner.state.clone();
        let visitor = next
            .visitors
            .iter_mut()
            .find(|visitor| &visitor.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        visitor.status = VisitorStatus::Out;
        let updated = visitor.clone();
        Self::commit(&mut inner, next).await?;
        Ok(updated)
    }

    pub async fn print_queue(&self) -> Result<PrintQueue> {
        let inner = self.inner.lock().await;
        let ids = LibSqlStateRepository::new(inner.db.connection())
            .load_print_queue()
            .await?;
        Ok(PrintQueue::from_ids(ids))
    }

    pub async fn save_print_queue(&self, queue: &PrintQueue) -> Result<()> {
        let inner = self.inner.lock().await;
        LibSqlStateRepository::new(inner.db.connection())
            .save_print_queue(queue.ids())
            .await
    }

    async fn commit(inner: &mut Inner, next: LocalState) -> Result<()> {
        LibSqlStateRepository::new(inner.db.connection())
            .replace_all(&next)
            .await?;
        inner.state = next;
        Ok(())
    }
}
