//! Merge of a fetched sheet snapshot with the local register.
//!
//! The merge is a pure function of the previous canonical list, the remote
//! records, the hidden ids, the dirty index and the current instant:
//!
//! 1. remote records with a hidden id are dropped;
//! 2. dirty entries older than [`DIRTY_WINDOW_MS`] expire;
//! 3. a local record is pending when its id is unconfirmed, or when it is still
//!    dirty and no remote record carries its fingerprint yet;
//! 4. remote records sharing a fingerprint with a pending record are dropped,
//!    so pending local data always wins;
//! 5. the result is pending-local followed by the remaining remote records,
//!    one record per id;
//! 6. the result is ordered by check-in instant, newest first, then by stay
//!    start, newest first (unparseable values count as epoch zero).

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Fingerprint, Visitor, VisitorId};

/// How long a local edit is shielded from a stale snapshot.
pub const DIRTY_WINDOW_MS: i64 = 120_000;

/// Ids the operator hid; never re-added by a merge.
pub type HiddenIds = BTreeSet<VisitorId>;

/// Record id → instant (Unix ms) of its last local mutation.
///
/// Serialized as a list of `[id, ms]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(VisitorId, i64)>", into = "Vec<(VisitorId, i64)>")]
pub struct DirtyIndex(BTreeMap<VisitorId, i64>);

impl DirtyIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local mutation of `id` at `at_ms`.
    pub fn mark(&mut self, id: VisitorId, at_ms: i64) {
        self.0.insert(id, at_ms);
    }

    #[must_use]
    pub fn contains(&self, id: &VisitorId) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &VisitorId) -> Option<i64> {
        self.0.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VisitorId, i64)> {
        self.0.iter().map(|(id, at)| (id, *at))
    }

    /// Entries still inside the protection window at `now_ms`.
    #[must_use]
    pub fn unexpired(&self, now_ms: i64) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(_, at)| now_ms.saturating_sub(**at) <= DIRTY_WINDOW_MS)
                .map(|(id, at)| (id.clone(), *at))
                .collect(),
        )
    }
}

impl From<Vec<(VisitorId, i64)>> for DirtyIndex {
    fn from(pairs: Vec<(VisitorId, i64)>) -> Self {
        Self(pairs.into_iter().collect())
    }
}

impl From<DirtyIndex> for Vec<(VisitorId, i64)> {
    fn from(index: DirtyIndex) -> Self {
        index.0.into_iter().collect()
    }
}

/// Counters describing what a merge did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Remote records dropped because their id is hidden
    pub remote_hidden: usize,
    /// Local records kept as pending
    pub pending_local: usize,
    /// Remote records dropped in favour of a pending local record
    pub remote_shadowed: usize,
    /// Dirty entries that expired during this merge
    pub dirty_expired: usize,
}

/// Result of a merge: the new canonical list and the new dirty index.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub visitors: Vec<Visitor>,
    pub dirty: DirtyIndex,
    pub stats: ReconcileStats,
}

/// Merge a remote snapshot into the local canonical list.
///
/// Callers only invoke this with a non-empty snapshot; an empty or failed
/// fetch must leave the local list untouched.
#[must_use]
pub fn reconcile(
    local: &[Visitor],
    remote: &[Visitor],
    hidden: &HiddenIds,
    dirty: &DirtyIndex,
    now_ms: i64,
) -> Reconciled {
    let visible_remote = remote
        .iter()
        .filter(|visitor| !hidden.contains(&visitor.id))
        .collect::<Vec<_>>();
    let remote_hidden = remote.len() - visible_remote.len();

    let dirty_before = dirty.len();
    let dirty = dirty.unexpired(now_ms);
    let dirty_expired = dirty_before - dirty.len();

    let remote_fingerprints = visible_remote
        .iter()
        .map(|visitor| visitor.fingerprint())
        .collect::<HashSet<Fingerprint>>();

    let pending = local
        .iter()
        .filter(|visitor| !hidden.contains(&visitor.id))
        .filter(|visitor| {
            visitor.id.is_unconfirmed()
                || (dirty.contains(&visitor.id)
                    && !remote_fingerprints.contains(&visitor.fingerprint()))
        })
        .collect::<Vec<_>>();

    let pending_fingerprints = pending
        .iter()
        .map(|visitor| visitor.fingerprint())
        .collect::<HashSet<Fingerprint>>();

    let kept_remote = visible_remote
        .into_iter()
        .filter(|visitor| !pending_fingerprints.contains(&visitor.fingerprint()))
        .collect::<Vec<_>>();
    let remote_shadowed = remote.len() - remote_hidden - kept_remote.len();

    let mut seen = HashSet::new();
    let mut visitors = pending
        .iter()
        .chain(kept_remote.iter())
        .filter(|visitor| seen.insert(visitor.id.clone()))
        .map(|visitor| (*visitor).clone())
        .collect::<Vec<_>>();
    sort_canonical(&mut visitors);

    let stats = ReconcileStats {
        remote_hidden,
        pending_local: pending.len(),
        remote_shadowed,
        dirty_expired,
    };

    Reconciled {
        visitors,
        dirty,
        stats,
    }
}

/// Order records newest check-in first, then newest stay start first.
///
/// The sort is stable, so fully tied records keep their relative order.
pub fn sort_canonical(visitors: &mut [Visitor]) {
    visitors.sort_by_cached_key(|visitor| {
        (
            Reverse(visitor.checked_in_millis()),
            Reverse(visitor.stay_start_millis()),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitorStatus;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_710_000_000_000;

    fn visitor(id: &str, name: &str, phone: &str, checked_in_at: &str) -> Visitor {
        Visitor {
            id: VisitorId::from(id),
            name: name.to_string(),
            phone: phone.to_string(),
            checked_in_at: checked_in_at.to_string(),
            ..Visitor::default()
        }
    }

    fn ids(visitors: &[Visitor]) -> Vec<&str> {
        visitors.iter().map(|visitor| visitor.id.as_str()).collect()
    }

    #[test]
    fn remote_only_snapshot_becomes_canonical() {
        let remote = vec![visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z")];

        let merged = reconcile(&[], &remote, &HiddenIds::new(), &DirtyIndex::new(), NOW);

        assert_eq!(merged.visitors, remote);
        assert!(merged.dirty.is_empty());
    }

    #[test]
    fn unconfirmed_local_record_survives_alongside_remote_rows() {
        let local = vec![visitor("local-1", "Ravi", "888", "2024-03-06T09:00:00.000Z")];
        let remote = vec![
            visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z"),
            visitor("v-mina", "Mina", "777", "2024-03-04T10:00:00.000Z"),
        ];
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("local-1"), NOW);

        let merged = reconcile(&local, &remote, &HiddenIds::new(), &dirty, NOW);

        assert_eq!(ids(&merged.visitors), vec!["local-1", "v-asha", "v-mina"]);
        assert_eq!(merged.stats.pending_local, 1);
    }

    #[test]
    fn hidden_ids_never_reappear() {
        let remote = vec![
            visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z"),
            visitor("v-mina", "Mina", "777", "2024-03-04T10:00:00.000Z"),
        ];
        let local = vec![visitor("local-9", "Hidden", "1", "2024-03-07T10:00:00.000Z")];
        let hidden = HiddenIds::from([VisitorId::from("v-asha"), VisitorId::from("local-9")]);

        let merged = reconcile(&local, &remote, &hidden, &DirtyIndex::new(), NOW);

        assert_eq!(ids(&merged.visitors), vec!["v-mina"]);
        assert_eq!(merged.stats.remote_hidden, 1);
    }

    #[test]
    fn pending_local_record_wins_fingerprint_collision() {
        let mut local_edit = visitor("local-1", "Ravi", "888", "2024-03-06T09:00:00.000Z");
        local_edit.place = "Local edit".to_string();
        let remote = vec![visitor("v-ravi", "RAVI", "888", "2024-03-06T09:00:05.000Z")];

        let merged = reconcile(
            &[local_edit.clone()],
            &remote,
            &HiddenIds::new(),
            &DirtyIndex::new(),
            NOW,
        );

        assert_eq!(merged.visitors, vec![local_edit]);
        assert_eq!(merged.stats.remote_shadowed, 1);
    }

    #[test]
    fn dirty_record_is_protected_until_remote_shows_its_fingerprint() {
        let mut edited = visitor("v-ravi", "Ravi K", "888", "2024-03-06T09:00:00.000Z");
        edited.status = VisitorStatus::In;
        let stale_remote = vec![visitor("v-ravi", "Ravi", "888", "2024-03-06T09:00:00.000Z")];
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("v-ravi"), NOW - 30_000);

        let merged = reconcile(
            &[edited.clone()],
            &stale_remote,
            &HiddenIds::new(),
            &dirty,
            NOW,
        );
        assert_eq!(merged.visitors, vec![edited.clone()]);
        assert!(merged.dirty.contains(&VisitorId::from("v-ravi")));

        let caught_up = vec![visitor("v-ravi-k", "Ravi K", "888", "2024-03-06T09:00:00.000Z")];
        let merged = reconcile(&[edited], &caught_up, &HiddenIds::new(), &dirty, NOW);
        assert_eq!(ids(&merged.visitors), vec!["v-ravi-k"]);
    }

    #[test]
    fn dirty_protection_lapses_after_the_window() {
        let edited = visitor("v-ravi", "Ravi K", "888", "2024-03-06T09:00:00.000Z");
        let remote = vec![visitor("v-ravi", "Ravi", "888", "2024-03-06T09:00:00.000Z")];
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("v-ravi"), NOW - DIRTY_WINDOW_MS - 1);

        let merged = reconcile(&[edited], &remote, &HiddenIds::new(), &dirty, NOW);

        assert_eq!(merged.visitors, remote);
        assert!(merged.dirty.is_empty());
    }

    #[test]
    fn dirty_entry_at_window_edge_is_kept() {
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("a"), NOW - DIRTY_WINDOW_MS);
        dirty.mark(VisitorId::from("b"), NOW - DIRTY_WINDOW_MS - 1);

        let kept = dirty.unexpired(NOW);

        assert!(kept.contains(&VisitorId::from("a")));
        assert!(!kept.contains(&VisitorId::from("b")));
    }

    #[test]
    fn corrupt_dirty_instants_do_not_overflow() {
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("ancient"), i64::MIN);
        dirty.mark(VisitorId::from("future"), i64::MAX);

        let kept = dirty.unexpired(NOW);

        assert!(!kept.contains(&VisitorId::from("ancient")));
        assert!(kept.contains(&VisitorId::from("future")));
    }

    #[test]
    fn ordering_prefers_later_check_in_then_later_stay_start() {
        let mut early_stay = visitor("v-a", "A", "1", "");
        early_stay.from_date = "01/03/2024".to_string();
        let mut late_stay = visitor("v-b", "B", "2", "");
        late_stay.from_date = "2024-03-09".to_string();
        let newest = visitor("v-c", "C", "3", "2024-03-06T09:00:00.000Z");
        let older = visitor("v-d", "D", "4", "2024-03-05T09:00:00.000Z");

        let merged = reconcile(
            &[],
            &[early_stay, older, late_stay, newest],
            &HiddenIds::new(),
            &DirtyIndex::new(),
            NOW,
        );

        assert_eq!(ids(&merged.visitors), vec!["v-c", "v-d", "v-b", "v-a"]);
    }

    #[test]
    fn merging_the_same_snapshot_twice_is_idempotent() {
        let local = vec![visitor("local-1", "Ravi", "888", "2024-03-06T09:00:00.000Z")];
        let remote = vec![
            visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z"),
            visitor("v-ravi", "Ravi", "888", "2024-03-06T09:00:00.000Z"),
            visitor("v-mina", "Mina", "777", ""),
        ];
        let hidden = HiddenIds::from([VisitorId::from("v-mina")]);
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("local-1"), NOW - 1_000);

        let first = reconcile(&local, &remote, &hidden, &dirty, NOW);
        let second = reconcile(&first.visitors, &remote, &hidden, &first.dirty, NOW);

        assert_eq!(first.visitors, second.visitors);
        assert_eq!(first.dirty, second.dirty);
    }

    #[test]
    fn canonical_list_has_one_record_per_id() {
        let local = vec![visitor("v-ravi", "Ravi K", "888", "2024-03-06T09:00:00.000Z")];
        let remote = vec![
            visitor("v-ravi", "Ravi", "888-old", "2024-03-06T09:00:00.000Z"),
            visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z"),
            visitor("v-asha", "Asha", "999", "2024-03-05T10:00:00.000Z"),
        ];
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("v-ravi"), NOW);

        let merged = reconcile(&local, &remote, &HiddenIds::new(), &dirty, NOW);

        assert_eq!(ids(&merged.visitors), vec!["v-ravi", "v-asha"]);
        assert_eq!(merged.visitors[0].name, "Ravi K");
    }

    #[test]
    fn dirty_index_serializes_as_pairs() {
        let mut dirty = DirtyIndex::new();
        dirty.mark(VisitorId::from("local-1"), 42);

        let json = serde_json::to_string(&dirty).unwrap();
        assert_eq!(json, r#"[["local-1",42]]"#);
        assert_eq!(serde_json::from_str::<DirtyIndex>(&json).unwrap(), dirty);
    }
}
