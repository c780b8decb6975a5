//! vms-core - Core library for Visitor Pro
//!
//! This crate contains the visitor model, the CSV and date routines that read
//! the published sheet, the reconciliation engine, the libSQL-backed local
//! store, and the sync scheduler used by the `vms` CLI.

pub mod analytics;
pub mod config;
pub mod csv;
pub mod dates;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod fees;
pub mod insights;
pub mod models;
pub mod print_queue;
pub mod reconcile;
pub mod remote;
pub mod search;
pub mod services;
pub mod store;
pub mod sync;
pub mod util;

pub use config::SyncConfig;
pub use diagnostics::DiagnosticLog;
pub use error::{Error, Result};
pub use models::{Visitor, VisitorDraft, VisitorId, VisitorStatus};
pub use remote::SheetClient;
pub use services::VisitorService;
pub use store::LocalStore;
