//! Operator-curated list of records staged for label printing.
//!
//! The queue references records by id only and is never touched by a merge.
//! [`LabelFields`] is the data handed to whatever renders the label.

use serde::Serialize;

use crate::models::{Visitor, VisitorId};

/// Ordered id list without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintQueue {
    ids: Vec<VisitorId>,
}

impl PrintQueue {
    /// Build a queue from stored ids, dropping repeats.
    #[must_use]
    pub fn from_ids(ids: Vec<VisitorId>) -> Self {
        let mut queue = Self::default();
        for id in ids {
            queue.add(id);
        }
        queue
    }

    /// Append `id`; returns `false` when it was already queued.
    pub fn add(&mut self, id: VisitorId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`; returns whether it was queued.
    pub fn remove(&mut self, id: &VisitorId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|queued| queued != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn ids(&self) -> &[VisitorId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Queued records in queue order, skipping ids no longer in `visitors`.
    #[must_use]
    pub fn resolve<'a>(&self, visitors: &'a [Visitor]) -> Vec<&'a Visitor> {
        self.ids
            .iter()
            .filter_map(|id| visitors.iter().find(|visitor| &visitor.id == id))
            .collect()
    }
}

/// Fields printed on a visitor label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelFields {
    pub name: String,
    pub place: String,
    pub masked_national_id: String,
    pub phone: String,
    pub stay: String,
    pub event: String,
}

impl LabelFields {
    #[must_use]
    pub fn from_visitor(visitor: &Visitor) -> Self {
        Self {
            name: visitor.name.clone(),
            place: visitor.place.clone(),
            masked_national_id: mask_national_id(&visitor.national_id),
            phone: visitor.phone.clone(),
            stay: format!(
                "{} to {} ({} days)",
                crate::dates::format_display_date(&visitor.from_date),
                crate::dates::format_display_date(&visitor.to_date),
                visitor.stay_days
            ),
            event: visitor.event.clone(),
        }
    }
}

/// Hide all but the last four characters of a national id.
///
/// Values of twelve or more characters once dashes are removed render as
/// `XXXX-XXXX-1234`. Shorter values keep their layout and replace every digit
/// that is immediately followed by four more digits.
#[must_use]
pub fn mask_national_id(value: &str) -> String {
    let compact = value.chars().filter(|ch| *ch != '-').collect::<Vec<_>>();
    if compact.len() >= 12 {
        let tail = compact[compact.len() - 4..].iter().collect::<String>();
        return format!("XXXX-XXXX-{tail}");
    }

    let chars = value.chars().collect::<Vec<_>>();
    chars
        .iter()
        .enumerate()
        .map(|(index, ch)| {
            let masked = ch.is_ascii_digit()
                && chars
                    .get(index + 1..=index + 4)
                    .is_some_and(|next| next.iter().all(char::is_ascii_digit));
            if masked {
                'X'
            } else {
                *ch
            }
        })
        .collect()
}
