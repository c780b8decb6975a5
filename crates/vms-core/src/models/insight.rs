//! Insight model produced by insight providers

use serde::{Deserialize, Serialize};

/// Category of an operational insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Security,
    Efficiency,
    #[default]
    General,
}

/// A short, actionable observation about the visitor register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Insight {
    /// Insight shown when no provider could analyse the records.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            title: "Analysis Unavailable".to_string(),
            description: "Could not analyse visitor patterns.".to_string(),
            kind: InsightKind::General,
            action: None,
        }
    }
}
