//! Sync cycles, their scheduling, and the mutation submitter.

mod engine;
mod scheduler;
mod submitter;

pub use engine::{CycleOutcome, SyncEngine};
pub use scheduler::{
    CycleGate, CycleGuard, CycleKind, SyncScheduler, FOLLOW_UP_DELAY, SILENT_INTERVAL,
};
pub use submitter::{MutationSubmitter, PushReport};
