//! Data models for Visitor Pro

mod insight;
mod visitor;

pub use insight::{Insight, InsightKind};
pub use visitor::{
    check_in_timestamp_now, Fingerprint, Visitor, VisitorDraft, VisitorId, VisitorStatus,
    LOCAL_ID_PREFIX, UNKNOWN_NAME,
};
