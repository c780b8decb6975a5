//! Remote sheet and write-channel configuration.
//!
//! A [`SyncConfig`] is always total: every field has a default, a partial
//! persisted override deserializes field by field onto those defaults, and a
//! [`SyncConfigPatch`] merges onto an existing config without leaving holes.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::util::normalize_text_option;

/// Host serving both the spreadsheet export and the form endpoint.
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://docs.google.com";

static SHEET_ID_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("sheet id pattern is valid")
});

/// External form field id for every record attribute pushed through the form
/// fallback channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMappings {
    pub name: String,
    pub gender: String,
    pub age: String,
    pub place: String,
    #[serde(rename = "aadhar")]
    pub national_id: String,
    pub group_leader: String,
    #[serde(rename = "jkpId")]
    pub secondary_id: String,
    pub from_date: String,
    pub to_date: String,
    pub am_pm: String,
    pub phone: String,
    pub event: String,
    #[serde(rename = "noOfDays")]
    pub stay_days: String,
    pub amount: String,
}

impl Default for FieldMappings {
    fn default() -> Self {
        Self {
            name: "entry.317214070".to_string(),
            gender: "entry.1306491324".to_string(),
            age: "entry.6489958".to_string(),
            place: "entry.103758466".to_string(),
            national_id: "entry.1041189906".to_string(),
            group_leader: "entry.453538488".to_string(),
            secondary_id: "entry.120930572".to_string(),
            from_date: "entry.1748803761".to_string(),
            to_date: "entry.673656392".to_string(),
            am_pm: "entry.74271214".to_string(),
            phone: "entry.2030673098".to_string(),
            event: "entry.1858985532".to_string(),
            stay_days: "entry.1162054468".to_string(),
            amount: "entry.618294482".to_string(),
        }
    }
}

/// Where the snapshot is read from and where records are written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Spreadsheet id; empty means sync is not configured
    pub sheet_id: String,
    /// Published form id used by the fallback write channel
    pub form_id: String,
    /// Script endpoint used by the primary write channel
    pub apps_script_url: String,
    pub sheet_base_url: String,
    pub form_base_url: String,
    pub mappings: FieldMappings,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            form_id: String::new(),
            apps_script_url: String::new(),
            sheet_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            form_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            mappings: FieldMappings::default(),
        }
    }
}

/// Partial update to a [`SyncConfig`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfigPatch {
    pub sheet_id: Option<String>,
    pub form_id: Option<String>,
    pub apps_script_url: Option<String>,
    pub sheet_base_url: Option<String>,
    pub form_base_url: Option<String>,
    pub mappings: Option<FieldMappingsPatch>,
}

/// Partial update to [`FieldMappings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMappingsPatch {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub place: Option<String>,
    #[serde(rename = "aadhar")]
    pub national_id: Option<String>,
    pub group_leader: Option<String>,
    #[serde(rename = "jkpId")]
    pub secondary_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub am_pm: Option<String>,
    pub phone: Option<String>,
    pub event: Option<String>,
    #[serde(rename = "noOfDays")]
    pub stay_days: Option<String>,
    pub amount: Option<String>,
}

impl SyncConfig {
    /// Load a config from a JSON file.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed also
    /// yields the defaults, with a warning.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&raw) {
            Ok(config) => Ok(config),
            Err(error) => {
                tracing::warn!(
                    "Ignoring unreadable sync config at {}: {error}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Persist the config as pretty JSON, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    /// Apply a patch. The sheet id is reduced to the bare id when a full URL
    /// is given; blank base URLs fall back to the default host.
    #[must_use]
    pub fn merge(mut self, patch: SyncConfigPatch) -> Self {
        if let Some(sheet_id) = patch.sheet_id {
            self.sheet_id = extract_sheet_id(&sheet_id);
        }
        if let Some(form_id) = patch.form_id {
            self.form_id = form_id.trim().to_string();
        }
        if let Some(url) = patch.apps_script_url {
            self.apps_script_url = url.trim().to_string();
        }
        if let Some(url) = patch.sheet_base_url {
            self.sheet_base_url = base_url_or_default(url);
        }
        if let Some(url) = patch.form_base_url {
            self.form_base_url = base_url_or_default(url);
        }
        if let Some(mappings) = patch.mappings {
            self.mappings = self.mappings.merge(mappings);
        }
        self
    }

    /// Whether a spreadsheet id is configured.
    #[must_use]
    pub fn has_sheet(&self) -> bool {
        !self.sheet_id.trim().is_empty()
    }

    /// Editor link for the configured spreadsheet.
    #[must_use]
    pub fn spreadsheet_url(&self) -> Option<String> {
        self.has_sheet().then(|| {
            format!(
                "{}/spreadsheets/d/{}/edit",
                self.sheet_base_url.trim_end_matches('/'),
                self.sheet_id.trim()
            )
        })
    }

    /// CSV export URL of the first sheet; `now_ms` defeats intermediate caches.
    #[must_use]
    pub fn snapshot_url(&self, now_ms: i64) -> Option<String> {
        self.has_sheet().then(|| {
            format!(
                "{}/spreadsheets/d/{}/export?format=csv&gid=0&t={now_ms}",
                self.sheet_base_url.trim_end_matches('/'),
                self.sheet_id.trim()
            )
        })
    }

    /// Response endpoint of the configured form.
    #[must_use]
    pub fn form_response_url(&self) -> Option<String> {
        let form_id = self.form_id.trim();
        (!form_id.is_empty()).then(|| {
            format!(
                "{}/forms/d/e/{form_id}/formResponse",
                self.form_base_url.trim_end_matches('/')
            )
        })
    }

    /// Script endpoint when one is configured.
    #[must_use]
    pub fn apps_script_endpoint(&self) -> Option<&str> {
        let url = self.apps_script_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl FieldMappings {
    #[must_use]
    pub fn merge(self, patch: FieldMappingsPatch) -> Self {
        Self {
            name: patch.name.unwrap_or(self.name),
            gender: patch.gender.unwrap_or(self.gender),
            age: patch.age.unwrap_or(self.age),
            place: patch.place.unwrap_or(self.place),
            national_id: patch.national_id.unwrap_or(self.national_id),
            group_leader: patch.group_leader.unwrap_or(self.group_leader),
            secondary_id: patch.secondary_id.unwrap_or(self.secondary_id),
            from_date: patch.from_date.unwrap_or(self.from_date),
            to_date: patch.to_date.unwrap_or(self.to_date),
            am_pm: patch.am_pm.unwrap_or(self.am_pm),
            phone: patch.phone.unwrap_or(self.phone),
            event: patch.event.unwrap_or(self.event),
            stay_days: patch.stay_days.unwrap_or(self.stay_days),
            amount: patch.amount.unwrap_or(self.amount),
        }
    }
}

/// Reduce a spreadsheet URL to its id; anything else is taken as the id.
#[must_use]
pub fn extract_sheet_id(input: &str) -> String {
    SHEET_ID_IN_URL
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| input.trim().to_string(), |id| id.as_str().to_string())
}

fn base_url_or_default(url: String) -> String {
    normalize_text_option(Some(url)).unwrap_or_else(|| DEFAULT_GOOGLE_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn extracts_id_from_spreadsheet_url() {
        assert_eq!(
            extract_sheet_id("https://docs.google.com/spreadsheets/d/14gZ5F2Kd-FX_RL/edit#gid=0"),
            "14gZ5F2Kd-FX_RL"
        );
        assert_eq!(extract_sheet_id("  bare-id_123 "), "bare-id_123");
        assert_eq!(extract_sheet_id(""), "");
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"sheetId":"abc","mappings":{"name":"entry.1"}}"#).unwrap();

        assert_eq!(config.sheet_id, "abc");
        assert_eq!(config.sheet_base_url, DEFAULT_GOOGLE_BASE_URL);
        assert_eq!(config.mappings.name, "entry.1");
        assert_eq!(config.mappings.phone, FieldMappings::default().phone);
    }

    #[test]
    fn merge_is_total_and_reduces_sheet_urls() {
        let patch = SyncConfigPatch {
            sheet_id: Some("https://docs.google.com/spreadsheets/d/xyz-1/edit".to_string()),
            sheet_base_url: Some("  ".to_string()),
            mappings: Some(FieldMappingsPatch {
                amount: Some("entry.9".to_string()),
                ..FieldMappingsPatch::default()
            }),
            ..SyncConfigPatch::default()
        };

        let merged = SyncConfig::default().merge(patch);

        assert_eq!(merged.sheet_id, "xyz-1");
        assert_eq!(merged.sheet_base_url, DEFAULT_GOOGLE_BASE_URL);
        assert_eq!(merged.mappings.amount, "entry.9");
        assert_eq!(merged.mappings.name, FieldMappings::default().name);
        assert_eq!(merged.form_id, "");
    }

    #[test]
    fn derived_urls_require_ids() {
        let config = SyncConfig::default();
        assert_eq!(config.snapshot_url(1), None);
        assert_eq!(config.form_response_url(), None);
        assert_eq!(config.apps_script_endpoint(), None);

        let config = SyncConfig {
            sheet_id: "sid".to_string(),
            form_id: "fid".to_string(),
            sheet_base_url: "http://127.0.0.1:9/".to_string(),
            ..SyncConfig::default()
        };
        assert_eq!(
            config.snapshot_url(42).as_deref(),
            Some("http://127.0.0.1:9/spreadsheets/d/sid/export?format=csv&gid=0&t=42")
        );
        assert_eq!(
            config.spreadsheet_url().as_deref(),
            Some("http://127.0.0.1:9/spreadsheets/d/sid/edit")
        );
        assert_eq!(
            config.form_response_url().as_deref(),
            Some("https://docs.google.com/forms/d/e/fid/formResponse")
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let config = SyncConfig::default().merge(SyncConfigPatch {
            sheet_id: Some("abc".to_string()),
            apps_script_url: Some("https://script.example/exec".to_string()),
            ..SyncConfigPatch::default()
        });

        config.save_to_path(&path).unwrap();

        assert_eq!(SyncConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn missing_or_corrupt_file_loads_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");
        assert_eq!(SyncConfig::load_from_path(&path).unwrap(), SyncConfig::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(SyncConfig::load_from_path(&path).unwrap(), SyncConfig::default());
    }
}
