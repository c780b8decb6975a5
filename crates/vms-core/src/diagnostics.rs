//! Operator-facing diagnostic log.
//!
//! A bounded buffer of `[HH:MM:SS] message` lines, newest first, plus the head
//! of the last raw snapshot response. Cloning shares the same buffer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of entries retained.
pub const LOG_CAPACITY: usize = 50;

/// Characters of the last raw response retained.
pub const RAW_RESPONSE_LIMIT: usize = 1000;

#[derive(Debug, Default)]
struct Buffer {
    entries: VecDeque<String>,
    last_raw_response: String,
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    buffer: Arc<Mutex<Buffer>>,
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message, evicting the oldest entry past capacity.
    pub fn append(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{message}");

        let stamp = chrono::Local::now().format("%H:%M:%S");
        let mut buffer = self.lock();
        buffer.entries.push_front(format!("[{stamp}] {message}"));
        buffer.entries.truncate(LOG_CAPACITY);
    }

    /// Entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn record_raw_response(&self, text: &str) {
        self.lock().last_raw_response = text.chars().take(RAW_RESPONSE_LIMIT).collect();
    }

    #[must_use]
    pub fn last_raw_response(&self) -> String {
        self.lock().last_raw_response.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
