//! Stay length and fee calculation for check-ins.

use crate::dates::parse_instant_millis;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Charge per stay day.
pub const DAILY_RATE: f64 = 150.0;

/// Flat surcharge for the named events.
#[must_use]
pub fn event_surcharge(event: &str) -> f64 {
    match event.trim() {
        "HP" | "SP" => 2100.0,
        "OTHER" => 100.0,
        _ => 0.0,
    }
}

/// Number of stay days between two dates.
///
/// Whole days rounded up, plus one when the stay starts in the afternoon
/// (`PM`). Zero when either date is missing or the range is reversed.
#[must_use]
pub fn stay_days(from_date: &str, to_date: &str, am_pm: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_instant_millis(from_date), parse_instant_millis(to_date))
    else {
        return 0;
    };

    let diff = end - start;
    let whole_days = if diff > 0 {
        (diff + DAY_MS - 1) / DAY_MS
    } else {
        diff / DAY_MS
    };
    let days = whole_days + i64::from(am_pm.trim().eq_ignore_ascii_case("PM"));

    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Amount due for a stay.
#[must_use]
pub fn stay_amount(stay_days: u32, event: &str) -> f64 {
    f64::from(stay_days) * DAILY_RATE + event_surcharge(event)
}
