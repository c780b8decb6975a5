//! Date normalization for heterogeneous sheet and form values.
//!
//! Sheet cells arrive as `DD/MM/YYYY`, `YYYY-MM-DD`, spreadsheet timestamps or
//! RFC 3339 instants. Everything parses to a zone-less [`NaiveDateTime`] which
//! is treated as UTC wherever an instant is needed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};

use crate::util::parse_leading_int;

/// Canonical display form for stay dates.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y", "%d.%m.%Y"];

/// Parse a date of unknown shape.
///
/// A three-part value split on `/`, `-` or `:` is read day-first when the first
/// part is at most 31 and the last exceeds 1000, and year-first when the first
/// part exceeds 1000. Anything else goes through a list of common layouts.
/// Returns `None` instead of failing.
#[must_use]
pub fn parse_any_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parts = value
        .split(|c: char| matches!(c, '/' | '-' | ':'))
        .collect::<Vec<_>>();
    if parts.len() == 3 {
        let first = parse_leading_int(parts[0]);
        let middle = parse_leading_int(parts[1]);
        let last = parse_leading_int(parts[2]);

        if let (Some(day), Some(month), Some(year)) = (first, middle, last) {
            if day <= 31 && year > 1000 {
                if let Some(date) = calendar_date(year, month, day) {
                    return Some(date);
                }
            }
        }
        if let (Some(year), Some(month), Some(day)) = (first, middle, last) {
            if year > 1000 {
                if let Some(date) = calendar_date(year, month, day) {
                    return Some(date);
                }
            }
        }
    }

    parse_generic(value)
}

/// Parse a date and return it as Unix milliseconds (zone-less values read as UTC).
#[must_use]
pub fn parse_instant_millis(value: &str) -> Option<i64> {
    parse_any_date(value).map(|date| date.and_utc().timestamp_millis())
}

/// Render a date in the `DD/MM/YYYY` display form.
///
/// Values already in that exact shape come back unchanged; blank markers become
/// `-`; values that cannot be parsed are passed through untouched.
#[must_use]
pub fn format_display_date(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == "-" || value == "undefined" {
        return "-".to_string();
    }
    if is_display_form(value) {
        return value.to_string();
    }

    parse_any_date(value).map_or_else(
        || value.to_string(),
        |date| date.format(DISPLAY_FORMAT).to_string(),
    )
}

/// Render an instant as an RFC 3339 UTC string with millisecond precision.
#[must_use]
pub fn to_rfc3339_utc(date: NaiveDateTime) -> String {
    date.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render Unix milliseconds as an RFC 3339 UTC string; out-of-range values
/// render as the epoch.
#[must_use]
pub fn millis_to_rfc3339(millis: i64) -> String {
    let instant = DateTime::from_timestamp_millis(millis).unwrap_or_default();
    to_rfc3339_utc(instant.naive_utc())
}

fn is_display_form(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            2 | 5 => *byte == b'/',
            _ => byte.is_ascii_digit(),
        })
}

fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDateTime> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn parse_generic(value: &str) -> Option<NaiveDateTime> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.naive_utc());
    }
    if let Ok(instant) = DateTime::parse_from_rfc2822(value) {
        return Some(instant.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(date: NaiveDateTime) -> (i32, u32, u32) {
        (date.year(), date.month(), date.day())
    }

    #[test]
    fn day_first_triple_resolves_as_day_month_year() {
        let parsed = parse_any_date("05/03/2024").unwrap();
        assert_eq!(ymd(parsed), (2024, 3, 5));
    }

    #[test]
    fn year_first_triple_resolves_as_year_month_day() {
        let parsed = parse_any_date("2024-03-05").unwrap();
        assert_eq!(ymd(parsed), (2024, 3, 5));
    }

    #[test]
    fn both_orderings_format_to_the_same_display_value() {
        assert_eq!(format_display_date("05/03/2024"), "05/03/2024");
        assert_eq!(format_display_date("2024-03-05"), "05/03/2024");
        assert_eq!(format_display_date("5/3/2024"), "05/03/2024");
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = format_display_date("2024-12-31");
        assert_eq!(once, "31/12/2024");
        assert_eq!(format_display_date(&once), once);
    }

    #[test]
    fn impossible_calendar_dates_are_unparseable() {
        assert!(parse_any_date("31/02/2024").is_none());
        assert!(parse_any_date("2024-13-01").is_none());
    }

    #[test]
    fn unparseable_values_return_none_and_pass_through_formatting() {
        assert!(parse_any_date("not a date").is_none());
        assert!(parse_any_date("").is_none());
        assert!(parse_any_date("10:30:15").is_none());
        assert_eq!(format_display_date("soon"), "soon");
    }

    #[test]
    fn blank_markers_format_as_dash() {
        assert_eq!(format_display_date(""), "-");
        assert_eq!(format_display_date("-"), "-");
        assert_eq!(format_display_date("undefined"), "-");
    }

    #[test]
    fn rfc3339_instants_fall_back_to_generic_parse() {
        let parsed = parse_any_date("2024-03-05T10:15:30.000Z").unwrap();
        assert_eq!(ymd(parsed), (2024, 3, 5));
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.minute(), 15);
    }

    #[test]
    fn spreadsheet_timestamps_are_read_day_first() {
        let parsed = parse_any_date("05/03/2024 14:22:10").unwrap();
        assert_eq!(ymd(parsed), (2024, 3, 5));
        assert_eq!(parsed.hour(), 14);
    }

    #[test]
    fn millis_render_as_utc_instants() {
        assert_eq!(millis_to_rfc3339(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            millis_to_rfc3339(1_709_633_730_000),
            "2024-03-05T10:15:30.000Z"
        );
    }

    #[test]
    fn rfc3339_rendering_roundtrips_through_parser() {
        let parsed = parse_any_date("05/03/2024").unwrap();
        let rendered = to_rfc3339_utc(parsed);
        assert_eq!(rendered, "2024-03-05T00:00:00.000Z");
        assert_eq!(
            parse_instant_millis(&rendered),
            Some(parsed.and_utc().timestamp_millis())
        );
    }
}
