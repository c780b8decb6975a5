//! Register search.
//!
//! A term matches a record when the name contains it case-insensitively, or
//! when the phone or national id contains it verbatim. An empty term matches
//! everything.

use crate::models::Visitor;

#[must_use]
pub fn matches(visitor: &Visitor, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    visitor.name.to_lowercase().contains(&term.to_lowercase())
        || visitor.phone.contains(term)
        || visitor.national_id.contains(term)
}

/// Records matching `term`, in register order.
#[must_use]
pub fn filter_visitors<'a>(visitors: &'a [Visitor], term: &str) -> Vec<&'a Visitor> {
    visitors
        .iter()
        .filter(|visitor| matches(visitor, term))
        .collect()
}
