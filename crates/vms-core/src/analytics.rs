//! Register statistics: totals, per-event breakdown and per-start-date counts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Visitor, VisitorStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStats {
    pub count: usize,
    pub revenue: f64,
    pub days: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegisterStats {
    /// Every record in the register
    pub footfall: usize,
    pub in_building: usize,
    pub revenue: f64,
    pub stay_days: u64,
    pub by_event: BTreeMap<String, EventStats>,
    /// Record count per stay start date, keyed by the stored date text
    pub by_start_date: BTreeMap<String, usize>,
}

impl RegisterStats {
    #[must_use]
    pub fn from_visitors(visitors: &[Visitor]) -> Self {
        visitors.iter().fold(Self::default(), |mut stats, visitor| {
            stats.footfall += 1;
            if visitor.status == VisitorStatus::In {
                stats.in_building += 1;
            }
            stats.revenue += visitor.amount;
            stats.stay_days += u64::from(visitor.stay_days);

            let event = stats.by_event.entry(visitor.event.clone()).or_default();
            event.count += 1;
            event.revenue += visitor.amount;
            event.days += u64::from(visitor.stay_days);

            *stats
                .by_start_date
                .entry(visitor.from_date.clone())
                .or_default() += 1;
            stats
        })
    }

    /// The event with the most records, ties broken by name.
    #[must_use]
    pub fn busiest_event(&self) -> Option<(&str, &EventStats)> {
        self.by_event
            .iter()
            .max_by(|(a_name, a), (b_name, b)| a.count.cmp(&b.count).then(b_name.cmp(a_name)))
            .map(|(name, stats)| (name.as_str(), stats))
    }
}
