//! Visitor record model

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::{parse_instant_millis, to_rfc3339_utc};
use crate::fees;

/// Prefix carried by identifiers minted locally before the sheet knows the row.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Placeholder name given to sheet rows with an empty name cell.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Identifier of a visitor record.
///
/// Either a locally minted, unconfirmed id (`local-…`) or a stable id derived
/// from the sheet row's timestamp, name and phone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(String);

impl VisitorId {
    /// Mint a new unconfirmed local id.
    #[must_use]
    pub fn new_local() -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{}", Uuid::now_v7()))
    }

    /// Derive the stable id of a sheet row.
    ///
    /// Every character outside `[A-Za-z0-9-]` becomes `-` and the result is
    /// lower-cased, so the same row always yields the same id.
    #[must_use]
    pub fn from_sheet_row(timestamp: &str, name: &str, phone: &str) -> Self {
        let raw = format!("v-{timestamp}-{name}-{phone}");
        let id = raw
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' {
                    ch.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        Self(id)
    }

    /// Whether the id was minted locally and has not been confirmed by the sheet.
    #[must_use]
    pub fn is_unconfirmed(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VisitorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VisitorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle status of a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VisitorStatus {
    #[serde(rename = "In-Building")]
    In,
    #[default]
    #[serde(rename = "Checked-Out")]
    Out,
    #[serde(rename = "Pending")]
    Pending,
}

impl VisitorStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::In => "In-Building",
            Self::Out => "Checked-Out",
            Self::Pending => "Pending",
        }
    }
}

/// Weak identity key: case-insensitive `name-phone`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn new(name: &str, phone: &str) -> Self {
        Self(format!("{name}-{phone}").to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A visitor record.
///
/// Field names on the wire follow the stored JSON layout and the remote
/// script payload (`aadharNo`, `jkpId`, `noOfDays`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visitor {
    pub id: VisitorId,
    pub name: String,
    pub gender: String,
    pub age: String,
    pub place: String,
    /// National identity number
    #[serde(rename = "aadharNo")]
    pub national_id: String,
    pub group_leader: String,
    /// Secondary organisation id
    #[serde(rename = "jkpId")]
    pub secondary_id: String,
    /// Stay start, textual until normalized
    pub from_date: String,
    /// Stay end, textual until normalized
    pub to_date: String,
    pub am_pm: String,
    pub phone: String,
    pub event: String,
    #[serde(rename = "noOfDays")]
    pub stay_days: u32,
    pub amount: f64,
    pub status: VisitorStatus,
    /// Check-in instant (RFC 3339)
    #[serde(rename = "checkInTimestamp")]
    pub checked_in_at: String,
}

impl Default for Visitor {
    fn default() -> Self {
        Self {
            id: VisitorId::from(""),
            name: String::new(),
            gender: "Male".to_string(),
            age: "0".to_string(),
            place: "-".to_string(),
            national_id: "-".to_string(),
            group_leader: "-".to_string(),
            secondary_id: "-".to_string(),
            from_date: "-".to_string(),
            to_date: "-".to_string(),
            am_pm: "AM".to_string(),
            phone: "-".to_string(),
            event: "NO EV".to_string(),
            stay_days: 0,
            amount: 0.0,
            status: VisitorStatus::Out,
            checked_in_at: String::new(),
        }
    }
}

impl Visitor {
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(&self.name, &self.phone)
    }

    /// Check-in instant in Unix ms, `0` when unparseable.
    #[must_use]
    pub fn checked_in_millis(&self) -> i64 {
        parse_instant_millis(&self.checked_in_at).unwrap_or(0)
    }

    /// Stay start in Unix ms, `0` when unparseable.
    #[must_use]
    pub fn stay_start_millis(&self) -> i64 {
        parse_instant_millis(&self.from_date).unwrap_or(0)
    }
}

/// Check-in form input: everything the operator types, nothing computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorDraft {
    pub name: String,
    pub gender: String,
    pub age: String,
    pub place: String,
    #[serde(rename = "aadharNo")]
    pub national_id: String,
    pub group_leader: String,
    #[serde(rename = "jkpId")]
    pub secondary_id: String,
    pub from_date: String,
    pub to_date: String,
    pub am_pm: String,
    pub phone: String,
    pub event: String,
}

impl Default for VisitorDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: "Male".to_string(),
            age: String::new(),
            place: String::new(),
            national_id: String::new(),
            group_leader: String::new(),
            secondary_id: String::new(),
            from_date: String::new(),
            to_date: String::new(),
            am_pm: "AM".to_string(),
            phone: String::new(),
            event: "NO EV".to_string(),
        }
    }
}

impl VisitorDraft {
    /// Prefill a draft from an existing record for editing.
    #[must_use]
    pub fn from_visitor(visitor: &Visitor) -> Self {
        Self {
            name: visitor.name.clone(),
            gender: visitor.gender.clone(),
            age: visitor.age.clone(),
            place: visitor.place.clone(),
            national_id: visitor.national_id.clone(),
            group_leader: visitor.group_leader.clone(),
            secondary_id: visitor.secondary_id.clone(),
            from_date: visitor.from_date.clone(),
            to_date: visitor.to_date.clone(),
            am_pm: visitor.am_pm.clone(),
            phone: visitor.phone.clone(),
            event: visitor.event.clone(),
        }
    }

    /// Complete the draft into an in-building record with computed stay values.
    #[must_use]
    pub fn into_visitor(self, id: VisitorId, checked_in_at: String) -> Visitor {
        let stay_days = fees::stay_days(&self.from_date, &self.to_date, &self.am_pm);
        let amount = fees::stay_amount(stay_days, &self.event);
        Visitor {
            id,
            name: self.name,
            gender: self.gender,
            age: self.age,
            place: self.place,
            national_id: self.national_id,
            group_leader: self.group_leader,
            secondary_id: self.secondary_id,
            from_date: self.from_date,
            to_date: self.to_date,
            am_pm: self.am_pm,
            phone: self.phone,
            event: self.event,
            stay_days,
            amount,
            status: VisitorStatus::In,
            checked_in_at,
        }
    }
}

/// Current instant rendered the way check-in timestamps are stored.
#[must_use]
pub fn check_in_timestamp_now() -> String {
    to_rfc3339_utc(chrono::Utc::now().naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ids_are_unconfirmed_and_unique() {
        let first = VisitorId::new_local();
        let second = VisitorId::new_local();
        assert!(first.is_unconfirmed());
        assert_ne!(first, second);
    }

    #[test]
    fn sheet_row_ids_are_stable_and_sanitized() {
        let id = VisitorId::from_sheet_row("05/03/2024 10:00:00", "Asha Rao", "+91 999");
        assert_eq!(id.as_str(), "v-05-03-2024-10-00-00-asha-rao--91-999");
        assert_eq!(
            id,
            VisitorId::from_sheet_row("05/03/2024 10:00:00", "Asha Rao", "+91 999")
        );
        assert!(!id.is_unconfirmed());
    }

    #[test]
    fn fingerprint_ignores_case() {
        assert_eq!(Fingerprint::new("RAVI", "888"), Fingerprint::new("ravi", "888"));
        assert_eq!(Fingerprint::new("Ravi", "888").as_str(), "ravi-888");
    }

    #[test]
    fn stored_json_uses_legacy_field_names() {
        let visitor = Visitor {
            id: VisitorId::from("local-1"),
            name: "Ravi".to_string(),
            national_id: "1234".to_string(),
            secondary_id: "J-9".to_string(),
            stay_days: 2,
            status: VisitorStatus::In,
            ..Visitor::default()
        };
        let json = serde_json::to_value(&visitor).unwrap();
        assert_eq!(json["aadharNo"], "1234");
        assert_eq!(json["jkpId"], "J-9");
        assert_eq!(json["noOfDays"], 2);
        assert_eq!(json["status"], "In-Building");
        assert_eq!(json["groupLeader"], "-");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let visitor: Visitor =
            serde_json::from_str(r#"{"id":"v-1","name":"Asha","phone":"999"}"#).unwrap();
        assert_eq!(visitor.id.as_str(), "v-1");
        assert_eq!(visitor.event, "NO EV");
        assert_eq!(visitor.status, VisitorStatus::Out);
        assert_eq!(visitor.checked_in_millis(), 0);
    }

    #[test]
    fn draft_completion_computes_stay_values() {
        let draft = VisitorDraft {
            name: "Ravi".to_string(),
            from_date: "2024-03-05".to_string(),
            to_date: "2024-03-07".to_string(),
            am_pm: "PM".to_string(),
            event: "HP".to_string(),
            ..VisitorDraft::default()
        };
        let visitor = draft.into_visitor(VisitorId::from("local-1"), check_in_timestamp_now());
        assert_eq!(visitor.stay_days, 3);
        assert!((visitor.amount - 2550.0).abs() < f64::EPSILON);
        assert_eq!(visitor.status, VisitorStatus::In);
        assert!(visitor.checked_in_millis() > 0);
    }
}
