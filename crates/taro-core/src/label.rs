//! Append-only label arena with per-edge dominance tracking (spec §4.4
//! step 3, §4.6).
//!
//! A label records one settled-or-frontier state reached on a given edge
//! at a given arrival tick, plus a predecessor chain back to the source.
//! Labels are never mutated or removed individually; a query resets the
//! arena between uses via [`DominanceLabelStore::reset`], which only
//! touches the edges actually written to (spec §4.6's "touched edges"
//! tracking), not the whole backing storage.

use crate::ident::{EdgeId, LabelId};
use crate::tick::Tick;

/// One reached state: an edge, the tick it was entered at, the
/// cumulative cost to reach it, and a link to the predecessor label.
#[derive(Clone, Copy, Debug)]
pub struct Label {
    /// The edge this label represents arrival on.
    pub edge: EdgeId,
    /// The tick at which this edge was entered.
    pub arrival_tick: Tick,
    /// Cumulative cost from the source to this label, in seconds.
    pub cumulative_cost: f64,
    /// The label this one was expanded from, or [`LabelId::NONE`] for a
    /// source label.
    pub predecessor: LabelId,
}

/// Append-only arena of [`Label`]s with a per-edge active-label index
/// used for dominance checks: given a new candidate label on `edge`, the
/// store can list prior labels on the same edge to decide whether the
/// candidate is dominated or dominates them.
#[derive(Default)]
pub struct DominanceLabelStore {
    labels: Vec<Label>,
    active_by_edge: std::collections::HashMap<EdgeId, Vec<LabelId>, rustc_hash::FxBuildHasher>,
    touched_edges: Vec<EdgeId>,
}

impl DominanceLabelStore {
    /// Creates an empty label store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of labels currently in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the arena holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Retrieves a label by id.
    #[must_use]
    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id.index()]
    }

    /// Returns the active (non-dominated) labels currently recorded on
    /// `edge`, in insertion order.
    #[must_use]
    pub fn active_on_edge(&self, edge: EdgeId) -> &[LabelId] {
        self.active_by_edge
            .get(&edge)
            .map_or(&[] as &[LabelId], Vec::as_slice)
    }

    /// Inserts a candidate label on `edge` after checking it against the
    /// edge's active labels (spec §4.4 step 4f's dominance rule): a label
    /// `A=(g_a, arr_a)` dominates `B=(g_b, arr_b)` iff `g_a <= g_b && arr_a
    /// <= arr_b`. If any active label dominates the candidate, it is
    /// discarded and `None` is returned; otherwise any active labels the
    /// candidate dominates are retired and the candidate is appended.
    pub fn try_insert(
        &mut self,
        edge: EdgeId,
        arrival_tick: Tick,
        cumulative_cost: f64,
        predecessor: LabelId,
    ) -> Option<LabelId> {
        let active: Vec<LabelId> = self.active_on_edge(edge).to_vec();
        let mut dominated = Vec::new();
        for candidate in active {
            let existing = self.get(candidate);
            if existing.cumulative_cost <= cumulative_cost && existing.arrival_tick <= arrival_tick {
                return None;
            }
            if cumulative_cost <= existing.cumulative_cost && arrival_tick <= existing.arrival_tick {
                dominated.push(candidate);
            }
        }
        for victim in dominated {
            self.retire(edge, victim);
        }
        Some(self.push(edge, arrival_tick, cumulative_cost, predecessor))
    }

    /// Appends a new label on `edge`, returning its id. The caller is
    /// responsible for having already performed any dominance check
    /// against [`Self::active_on_edge`]; [`Self::try_insert`] does this
    /// for the common case.
    pub fn push(
        &mut self,
        edge: EdgeId,
        arrival_tick: Tick,
        cumulative_cost: f64,
        predecessor: LabelId,
    ) -> LabelId {
        let id = LabelId(self.labels.len() as i32);
        self.labels.push(Label {
            edge,
            arrival_tick,
            cumulative_cost,
            predecessor,
        });
        let bucket = self.active_by_edge.entry(edge).or_default();
        if bucket.is_empty() {
            self.touched_edges.push(edge);
        }
        bucket.push(id);
        id
    }

    /// Removes `victim` from `edge`'s active-label list because a new
    /// label dominates it. The underlying [`Label`] storage entry is
    /// left in place (predecessor chains from other labels may still
    /// reference it); only its membership in the active set is dropped.
    pub fn retire(&mut self, edge: EdgeId, victim: LabelId) {
        if let Some(bucket) = self.active_by_edge.get_mut(&edge) {
            bucket.retain(|&id| id != victim);
        }
    }

    /// Clears the arena, resetting only the edges touched since the last
    /// reset (spec §4.6) rather than re-allocating or zeroing the whole
    /// backing map.
    pub fn reset(&mut self) {
        self.labels.clear();
        for edge in self.touched_edges.drain(..) {
            self.active_by_edge.remove(&edge);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn push_and_get_roundtrip() {
        let mut store = DominanceLabelStore::new();
        let id = store.push(EdgeId(0), 10, 5.0, LabelId::NONE);
        let label = store.get(id);
        assert_eq!(label.edge, EdgeId(0));
        assert_eq!(label.arrival_tick, 10);
        assert!((label.cumulative_cost - 5.0).abs() < 1e-9);
        assert!(label.predecessor.is_none());
    }

    #[test]
    fn active_on_edge_tracks_insertion_order() {
        let mut store = DominanceLabelStore::new();
        let a = store.push(EdgeId(0), 10, 5.0, LabelId::NONE);
        let b = store.push(EdgeId(0), 12, 6.0, LabelId::NONE);
        assert_eq!(store.active_on_edge(EdgeId(0)), &[a, b]);
    }

    #[test]
    fn retire_removes_from_active_but_not_storage() {
        let mut store = DominanceLabelStore::new();
        let a = store.push(EdgeId(0), 10, 5.0, LabelId::NONE);
        let b = store.push(EdgeId(0), 12, 6.0, LabelId::NONE);
        store.retire(EdgeId(0), a);
        assert_eq!(store.active_on_edge(EdgeId(0)), &[b]);
        // storage entry for `a` is still reachable.
        assert_eq!(store.get(a).edge, EdgeId(0));
    }

    #[test]
    fn try_insert_discards_dominated_candidate() {
        let mut store = DominanceLabelStore::new();
        store.push(EdgeId(0), 5, 5.0, LabelId::NONE);
        let result = store.try_insert(EdgeId(0), 6, 6.0, LabelId::NONE);
        assert!(result.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn try_insert_retires_labels_it_dominates() {
        let mut store = DominanceLabelStore::new();
        let old = store.push(EdgeId(0), 10, 10.0, LabelId::NONE);
        let result = store.try_insert(EdgeId(0), 5, 5.0, LabelId::NONE);
        assert!(result.is_some());
        assert_eq!(store.active_on_edge(EdgeId(0)), &[result.unwrap()]);
        // storage entry for `old` is still reachable even though retired.
        assert_eq!(store.get(old).edge, EdgeId(0));
    }

    #[test]
    fn try_insert_keeps_incomparable_labels_both_active() {
        let mut store = DominanceLabelStore::new();
        let a = store.try_insert(EdgeId(0), 10, 5.0, LabelId::NONE).unwrap();
        let b = store.try_insert(EdgeId(0), 5, 10.0, LabelId::NONE).unwrap();
        assert_eq!(store.active_on_edge(EdgeId(0)), &[a, b]);
    }

    #[test]
    fn reset_only_clears_touched_edges() {
        let mut store = DominanceLabelStore::new();
        store.push(EdgeId(0), 10, 5.0, LabelId::NONE);
        store.push(EdgeId(1), 11, 6.0, LabelId::NONE);
        store.reset();
        assert!(store.is_empty());
        assert!(store.active_on_edge(EdgeId(0)).is_empty());
        assert!(store.active_on_edge(EdgeId(1)).is_empty());
    }
}
