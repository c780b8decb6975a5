//! Timer-driven and on-demand sync cycles with mutual exclusion.
//!
//! An explicit request is skipped only while another explicit cycle runs. A
//! silent request is skipped while any explicit cycle runs or while another
//! silent cycle runs. Flags are cleared when the cycle finishes, whatever the
//! outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::remote::SnapshotSource;

use super::engine::{CycleOutcome, SyncEngine};

/// Period of background silent cycles.
pub const SILENT_INTERVAL: Duration = Duration::from_secs(15);

/// Delay before the convergence cycle that follows a successful write.
pub const FOLLOW_UP_DELAY: Duration = Duration::from_secs(4);

/// Who asked for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Startup or operator request
    Explicit,
    /// Timer or post-write follow-up
    Silent,
}

/// In-flight flags for both cycle kinds.
#[derive(Debug, Default)]
pub struct CycleGate {
    explicit: AtomicBool,
    silent: AtomicBool,
}

/// Clears the flag it was issued for when dropped.
#[must_use = "the cycle counts as finished once the guard is dropped"]
#[derive(Debug)]
pub struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl CycleGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag for `kind`, or `None` when the request must be skipped.
    pub fn try_enter(&self, kind: CycleKind) -> Option<CycleGuard<'_>> {
        match kind {
            CycleKind::Explicit => Self::claim(&self.explicit),
            CycleKind::Silent => {
                if self.explicit.load(Ordering::Acquire) {
                    return None;
                }
                Self::claim(&self.silent)
            }
        }
    }

    #[must_use]
    pub fn is_running(&self, kind: CycleKind) -> bool {
        match kind {
            CycleKind::Explicit => self.explicit.load(Ordering::Acquire),
            CycleKind::Silent => self.silent.load(Ordering::Acquire),
        }
    }

    fn claim(flag: &AtomicBool) -> Option<CycleGuard<'_>> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { flag })
    }
}

/// Shared handle that runs gated cycles on an engine.
pub struct SyncScheduler<S> {
    engine: Arc<SyncEngine<S>>,
    gate: Arc<CycleGate>,
}

impl<S> Clone for SyncScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S: SnapshotSource + 'static> SyncScheduler<S> {
    #[must_use]
    pub fn new(engine: SyncEngine<S>) -> Self {
        Self {
            engine: Arc::new(engine),
            gate: Arc::new(CycleGate::new()),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }

    #[must_use]
    pub fn gate(&self) -> &CycleGate {
        &self.gate
    }

    /// Run one cycle of `kind` unless the gate says to skip it.
    pub async fn request(&self, kind: CycleKind) -> Result<CycleOutcome> {
        let Some(_guard) = self.gate.try_enter(kind) else {
            tracing::debug!("Skipping {kind:?} sync, another cycle is in flight");
            return Ok(CycleOutcome::Skipped);
        };

        let outcome = self.engine.run_cycle().await?;
        match &outcome {
            CycleOutcome::Failed(..) => tracing::warn!("{kind:?} sync {outcome}"),
            _ => tracing::info!("{kind:?} sync {outcome}"),
        }
        Ok(outcome)
    }

    /// One explicit cycle, then a silent cycle every [`SILENT_INTERVAL`]
    /// until the task is dropped. Silent cycles run on their own tasks so a
    /// slow fetch never delays the timer.
    pub async fn run(&self) {
        if let Err(error) = self.request(CycleKind::Explicit).await {
            tracing::error!("Startup sync failed: {error}");
        }

        let start = tokio::time::Instant::now() + SILENT_INTERVAL;
        let mut ticker = tokio::time::interval_at(start, SILENT_INTERVAL);
        loop {
            ticker.tick().await;
            let scheduler = self.clone();
            tokio::spawn(async move {
                if let Err(error) = scheduler.request(CycleKind::Silent).await {
                    tracing::error!("Periodic sync failed: {error}");
                }
            });
        }
    }

    /// Wait [`FOLLOW_UP_DELAY`] and request one silent cycle.
    pub async fn follow_up(&self) -> Result<CycleOutcome> {
        tokio::time::sleep(FOLLOW_UP_DELAY).await;
        self.request(CycleKind::Silent).await
    }
}
