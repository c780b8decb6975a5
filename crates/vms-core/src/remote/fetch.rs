//! Snapshot fetch over HTTP and snapshot text processing.

use crate::config::SyncConfig;
use crate::csv::parse_csv;
use crate::models::Visitor;

use super::rows::visitor_from_row;
use super::{SnapshotSource, SyncError};

/// Responses this short are treated as a failed export.
pub const MIN_SNAPSHOT_LEN: usize = 21;

/// HTTP client for the published sheet and its write channels.
#[derive(Debug, Clone)]
pub struct SheetClient {
    pub(super) http: reqwest::Client,
    pub(super) config: SyncConfig,
}

impl SheetClient {
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    #[must_use]
    pub const fn with_client(http: reqwest::Client, config: SyncConfig) -> Self {
        Self { http, config }
    }

    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }
}

impl SnapshotSource for SheetClient {
    async fn fetch_snapshot(&self, now_ms: i64) -> Result<String, SyncError> {
        let url = self
            .config
            .snapshot_url(now_ms)
            .ok_or(SyncError::MissingSheetId)?;
        tracing::debug!("Fetching snapshot from {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        if text.len() < MIN_SNAPSHOT_LEN {
            return Err(SyncError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Turn snapshot text into visitor records.
///
/// Markup in the response means the sheet is not published and fails the
/// cycle. Fewer than two rows (header only) yields no records. Row 0 is the
/// header and is skipped; rows without a name are dropped.
pub fn process_snapshot_text(text: &str, now_ms: i64) -> Result<Vec<Visitor>, SyncError> {
    if text.trim().is_empty() {
        return Err(SyncError::EmptyResponse);
    }
    if text.contains("<!DOCTYPE") || text.contains("google-site-verification") {
        return Err(SyncError::NotPublished);
    }

    let rows = parse_csv(text.trim());
    if rows.len() < 2 {
        return Ok(Vec::new());
    }

    Ok(rows
        .iter()
        .skip(1)
        .filter_map(|row| visitor_from_row(row, now_ms))
        .collect())
}
