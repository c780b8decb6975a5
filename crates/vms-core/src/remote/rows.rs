//! Positional sheet row → visitor record mapping.
//!
//! Column order: timestamp, name, gender, age, place, national id, group
//! leader, secondary id, from date, to date, am/pm, phone, event, days,
//! amount. Missing or blank cells take defaults rather than failing.

use crate::dates::{format_display_date, millis_to_rfc3339, parse_any_date, to_rfc3339_utc};
use crate::models::{Visitor, VisitorId, VisitorStatus, UNKNOWN_NAME};
use crate::util::parse_leading_int;

/// Map one data row. Returns `None` for rows without a name.
#[must_use]
pub fn visitor_from_row(cells: &[String], now_ms: i64) -> Option<Visitor> {
    let cell = |index: usize| cells.get(index).map_or("", |value| value.trim());
    let or = |index: usize, fallback: &str| {
        let value = cell(index);
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };

    let name = or(1, UNKNOWN_NAME);
    if name == UNKNOWN_NAME {
        return None;
    }

    let timestamp = cell(0);
    let phone = or(11, "-");
    let checked_in_at = parse_any_date(timestamp)
        .map_or_else(|| millis_to_rfc3339(now_ms), to_rfc3339_utc);

    Some(Visitor {
        id: VisitorId::from_sheet_row(timestamp, &name, &phone),
        gender: or(2, "Male"),
        age: or(3, "0"),
        place: or(4, "-"),
        national_id: or(5, "-"),
        group_leader: or(6, "-"),
        secondary_id: or(7, "-"),
        from_date: format_display_date(cell(8)),
        to_date: format_display_date(cell(9)),
        am_pm: or(10, "AM"),
        event: or(12, "NO EV"),
        stay_days: parse_days(cell(13)),
        amount: parse_amount(cell(14)),
        status: VisitorStatus::Out,
        checked_in_at,
        name,
        phone,
    })
}

fn parse_days(value: &str) -> u32 {
    parse_leading_int(value)
        .and_then(|days| u32::try_from(days).ok())
        .unwrap_or(0)
}

fn parse_amount(value: &str) -> f64 {
    let cleaned = value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect::<String>();
    // Longest numeric prefix, so stray separators after the number are ignored.
    (1..=cleaned.len())
        .rev()
        .find_map(|end| cleaned[..end].parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}
