//! Insight providers: records in, observations and a summary out.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike};

use crate::analytics::RegisterStats;
use crate::models::{Insight, InsightKind, Visitor};

/// Turns the register into insights and a short summary.
pub trait InsightProvider {
    fn insights(&self, visitors: &[Visitor]) -> Vec<Insight>;

    fn summary(&self, visitors: &[Visitor]) -> String;
}

/// Insights from `provider`, or the single "Analysis Unavailable" insight
/// when it produced none.
pub fn insights_or_fallback<P: InsightProvider + ?Sized>(
    provider: &P,
    visitors: &[Visitor],
) -> Vec<Insight> {
    let insights = provider.insights(visitors);
    if insights.is_empty() {
        vec![Insight::unavailable()]
    } else {
        insights
    }
}

/// Deterministic insights computed from the register statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalInsights;

impl InsightProvider for LocalInsights {
    fn insights(&self, visitors: &[Visitor]) -> Vec<Insight> {
        if visitors.is_empty() {
            return Vec::new();
        }
        let stats = RegisterStats::from_visitors(visitors);
        let mut insights = Vec::new();

        if stats.in_building > 0 {
            insights.push(Insight {
                title: "Visitors on premises".to_string(),
                description: format!(
                    "{} of {} registered visitors are still marked in-building.",
                    stats.in_building, stats.footfall
                ),
                kind: InsightKind::Security,
                action: Some("Confirm check-outs before closing".to_string()),
            });
        }

        let missing_ids = visitors
            .iter()
            .filter(|visitor| matches!(visitor.national_id.trim(), "" | "-"))
            .count();
        if missing_ids > 0 {
            insights.push(Insight {
                title: "Missing identity numbers".to_string(),
                description: format!("{missing_ids} records have no national id."),
                kind: InsightKind::Security,
                action: Some("Collect ids at the desk on next contact".to_string()),
            });
        }

        if let Some((event, event_stats)) = stats.busiest_event() {
            insights.push(Insight {
                title: format!("{event} drives attendance"),
                description: format!(
                    "{} visitors ({} stay days) are registered for {event}.",
                    event_stats.count, event_stats.days
                ),
                kind: InsightKind::Efficiency,
                action: None,
            });
        }

        if let Some((hour, count)) = peak_arrival_hour(visitors) {
            insights.push(Insight {
                title: "Peak arrival hour".to_string(),
                description: format!("{count} check-ins happened between {hour:02}:00 and {hour:02}:59 UTC."),
                kind: InsightKind::Efficiency,
                action: Some("Staff the desk ahead of this hour".to_string()),
            });
        }

        if let Some((place, count)) = top_place(visitors) {
            insights.push(Insight {
                title: "Most common origin".to_string(),
                description: format!("{count} visitors came from {place}."),
                kind: InsightKind::General,
                action: None,
            });
        }

        insights
    }

    fn summary(&self, visitors: &[Visitor]) -> String {
        if visitors.is_empty() {
            return "No visitors recorded.".to_string();
        }
        let stats = RegisterStats::from_visitors(visitors);
        let mut summary = format!(
            "{} visitors recorded, {} currently in-building. Revenue {:.2} across {} stay days.",
            stats.footfall, stats.in_building, stats.revenue, stats.stay_days
        );
        if let Some((event, _)) = stats.busiest_event() {
            summary.push_str(&format!(" Busiest event: {event}."));
        }
        summary
    }
}

fn peak_arrival_hour(visitors: &[Visitor]) -> Option<(u32, usize)> {
    let mut by_hour = BTreeMap::<u32, usize>::new();
    for visitor in visitors {
        let millis = visitor.checked_in_millis();
        if millis == 0 {
            continue;
        }
        if let Some(instant) = DateTime::from_timestamp_millis(millis) {
            *by_hour.entry(instant.hour()).or_default() += 1;
        }
    }
    by_hour
        .into_iter()
        .max_by(|(a_hour, a), (b_hour, b)| a.cmp(b).then(b_hour.cmp(a_hour)))
}

fn top_place(visitors: &[Visitor]) -> Option<(String, usize)> {
    let mut by_place = BTreeMap::<String, usize>::new();
    for visitor in visitors {
        let place = visitor.place.trim();
        if place.is_empty() || place == "-" {
            continue;
        }
        *by_place.entry(place.to_string()).or_default() += 1;
    }
    by_place
        .into_iter()
        .max_by(|(a_place, a), (b_place, b)| a.cmp(b).then(b_place.cmp(a_place)))
}
