//! Shared services used by clients.

mod visitor_service;

pub use visitor_service::{Submission, VisitorService};
