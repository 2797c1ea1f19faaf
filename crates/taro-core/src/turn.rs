//! Sparse turn-penalty table (spec §3, §4.2 step 5).
//!
//! Absence of a `TurnCostMap` on a query, or absence of a specific
//! `(from_edge, to_edge)` pair within one, both mean "no turn
//! contribution" — the map only ever adds cost or forbids a transition,
//! never subtracts.

use rustc_hash::FxHashMap;

use crate::ident::EdgeId;

/// Sentinel penalty meaning the `(from, to)` transition is forbidden
/// outright (spec §4.2 step 5: a turn-restriction, not a delay).
pub const FORBIDDEN: f32 = f32::INFINITY;

/// Immutable sparse map from `(from_edge, to_edge)` to an additive
/// turn-penalty cost, keyed on consecutive edges in a path (edge-based
/// transitions, spec §4.3).
#[derive(Clone, Debug, Default)]
pub struct TurnCostMap {
    penalties: FxHashMap<(EdgeId, EdgeId), f32>,
}

impl TurnCostMap {
    /// Builds a turn-cost map from explicit `(from_edge, to_edge, penalty)`
    /// triples. A `penalty` of [`FORBIDDEN`] marks the transition as not
    /// traversable.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (EdgeId, EdgeId, f32)>) -> Self {
        let penalties = entries
            .into_iter()
            .map(|(from, to, penalty)| ((from, to), penalty))
            .collect();
        Self { penalties }
    }

    /// Number of explicit transitions recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.penalties.len()
    }

    /// Returns `true` if no transitions are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.penalties.is_empty()
    }

    /// Looks up the additive penalty, in seconds, for moving from `from`
    /// directly onto `to`. Absence of the pair means zero penalty.
    #[must_use]
    pub fn penalty(&self, from: EdgeId, to: EdgeId) -> f32 {
        self.penalties.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// Returns `true` if the `from -> to` transition is forbidden.
    #[must_use]
    pub fn is_forbidden(&self, from: EdgeId, to: EdgeId) -> bool {
        self.penalty(from, to).is_infinite()
    }
}
