//! Thread-confined, reusable per-query scratch buffers (spec §4.6).
//!
//! A [`PlannerQueryContext`]/[`MatrixQueryContext`] is owned by a single
//! calling thread for the duration of one query and is expected to be
//! reset and reused across queries rather than reallocated, avoiding
//! allocator churn on the hot path. Neither type implements `Sync`; a
//! caller running concurrent queries allocates one context per thread.

use std::collections::BinaryHeap;

use crate::budget::BudgetCounters;
use crate::frontier::{BackwardFrontierState, ForwardFrontierState};
use crate::label::DominanceLabelStore;

/// Reusable scratch state for one point-to-point [`crate::planner_astar`]
/// query.
#[derive(Default)]
pub struct PlannerQueryContext {
    /// Forward-lane priority queue.
    pub forward_open: BinaryHeap<ForwardFrontierState>,
    /// Backward-lane priority queue.
    pub backward_open: BinaryHeap<BackwardFrontierState>,
    /// Forward-lane label arena.
    pub forward_labels: DominanceLabelStore,
    /// Backward-lane best-known cost per node, reset via `touched_nodes`.
    pub backward_best: std::collections::HashMap<crate::ident::NodeId, f64, rustc_hash::FxBuildHasher>,
    touched_backward_nodes: Vec<crate::ident::NodeId>,
    /// Live counters checked against the query's [`crate::budget::SearchBudget`].
    pub counters: BudgetCounters,
}

impl PlannerQueryContext {
    /// Creates an empty context with no preallocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `node` as touched in the backward-lane cost map so
    /// [`Self::reset`] can clear exactly the entries written this query.
    pub fn mark_backward_touched(&mut self, node: crate::ident::NodeId) {
        if self.backward_best.insert(node, f64::INFINITY).is_none() {
            self.touched_backward_nodes.push(node);
        }
    }

    /// Clears all per-query state for reuse on the next query, without
    /// deallocating the underlying buffers.
    pub fn reset(&mut self) {
        self.forward_open.clear();
        self.backward_open.clear();
        self.forward_labels.reset();
        for node in self.touched_backward_nodes.drain(..) {
            self.backward_best.remove(&node);
        }
        self.counters = BudgetCounters::default();
    }
}

/// Reusable scratch state for one [`crate::planner_matrix`] one-to-many
/// query, shared across the rows of a single request by resetting
/// between rows.
#[derive(Default)]
pub struct MatrixQueryContext {
    /// Priority queue shared by the native one-to-many sweep.
    pub open: BinaryHeap<ForwardFrontierState>,
    /// Label arena for the current row.
    pub labels: DominanceLabelStore,
    /// Live counters checked against the row's [`crate::budget::MatrixBudget`].
    pub row_counters: BudgetCounters,
    /// Cumulative work counter across the whole request, never reset
    /// between rows.
    pub request_work: u64,
}

impl MatrixQueryContext {
    /// Creates an empty context with no preallocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-row state between rows of the same request, without
    /// touching `request_work`.
    pub fn reset_row(&mut self) {
        self.open.clear();
        self.labels.reset();
        self.row_counters = BudgetCounters::default();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::ident::NodeId;

    #[test]
    fn planner_context_reset_clears_touched_backward_nodes() {
        let mut ctx = PlannerQueryContext::new();
        ctx.mark_backward_touched(NodeId(0));
        ctx.mark_backward_touched(NodeId(1));
        assert_eq!(ctx.backward_best.len(), 2);
        ctx.reset();
        assert!(ctx.backward_best.is_empty());
    }

    #[test]
    fn matrix_context_reset_row_preserves_request_work() {
        let mut ctx = MatrixQueryContext::new();
        ctx.request_work = 42;
        ctx.row_counters.settled = 5;
        ctx.reset_row();
        assert_eq!(ctx.request_work, 42);
        assert_eq!(ctx.row_counters.settled, 0);
    }
}
