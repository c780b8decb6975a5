pub mod checkin;
pub mod common;
pub mod completions;
pub mod config;
pub mod hide;
pub mod list;
pub mod queue;
pub mod stats;
pub mod sync;
