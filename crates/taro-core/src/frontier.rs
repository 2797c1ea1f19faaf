//! Frontier states ordered for use in a [`std::collections::BinaryHeap`]
//! (spec §4.4, §4.7's deterministic tie-breaking).
//!
//! `BinaryHeap` is a max-heap, so both states implement `Ord` such that
//! the *lowest*-priority state compares greatest — callers push these
//! directly and `pop()` returns the minimum. Ties on the primary cost
//! key break on a sequence of explicit integer keys so that identical
//! runs produce identical expansion order regardless of insertion
//! timing or hash iteration order.

use std::cmp::Ordering;

use crate::ident::{EdgeId, LabelId, NodeId};
use crate::tick::Tick;

/// Priority-queue entry for the forward (exact, time-dependent) lane.
#[derive(Clone, Copy, Debug)]
pub struct ForwardFrontierState {
    /// `g + h`: cumulative cost so far plus heuristic estimate.
    pub priority: f64,
    /// Cumulative cost from the source, used as a tie-break key before
    /// falling back to edge/label identity.
    pub cumulative_cost: f64,
    /// The edge this state settles on.
    pub edge: EdgeId,
    /// The arrival tick at `edge`.
    pub arrival_tick: Tick,
    /// The label recording this state's predecessor chain.
    pub label: LabelId,
}

impl PartialEq for ForwardFrontierState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for ForwardFrontierState {}

impl PartialOrd for ForwardFrontierState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ForwardFrontierState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the minimum priority.
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.cumulative_cost.partial_cmp(&self.cumulative_cost).unwrap_or(Ordering::Equal))
            .then_with(|| other.edge.cmp(&self.edge))
            .then_with(|| other.label.cmp(&self.label))
    }
}

/// Priority-queue entry for the backward (static lower-bound) lane.
#[derive(Clone, Copy, Debug)]
pub struct BackwardFrontierState {
    /// `g + h`: cumulative static lower-bound cost plus heuristic.
    pub priority: f64,
    /// Cumulative static lower-bound cost from the goal.
    pub cumulative_cost: f64,
    /// The node this state settles.
    pub node: NodeId,
}

impl PartialEq for BackwardFrontierState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for BackwardFrontierState {}

impl PartialOrd for BackwardFrontierState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BackwardFrontierState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.cumulative_cost.partial_cmp(&self.cumulative_cost).unwrap_or(Ordering::Equal))
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn forward_heap_pops_lowest_priority_first() {
        let mut heap = BinaryHeap::new();
        heap.push(ForwardFrontierState {
            priority: 5.0,
            cumulative_cost: 5.0,
            edge: EdgeId(1),
            arrival_tick: 0,
            label: LabelId(1),
        });
        heap.push(ForwardFrontierState {
            priority: 2.0,
            cumulative_cost: 2.0,
            edge: EdgeId(0),
            arrival_tick: 0,
            label: LabelId(0),
        });
        let first = heap.pop().unwrap();
        assert!((first.priority - 2.0).abs() < 1e-9);
    }

    #[test]
    fn forward_heap_breaks_ties_on_edge_id() {
        let mut heap = BinaryHeap::new();
        heap.push(ForwardFrontierState {
            priority: 1.0,
            cumulative_cost: 1.0,
            edge: EdgeId(5),
            arrival_tick: 0,
            label: LabelId(0),
        });
        heap.push(ForwardFrontierState {
            priority: 1.0,
            cumulative_cost: 1.0,
            edge: EdgeId(1),
            arrival_tick: 0,
            label: LabelId(1),
        });
        let first = heap.pop().unwrap();
        assert_eq!(first.edge, EdgeId(1));
    }

    #[test]
    fn backward_heap_pops_lowest_priority_first() {
        let mut heap = BinaryHeap::new();
        heap.push(BackwardFrontierState {
            priority: 5.0,
            cumulative_cost: 5.0,
            node: NodeId(1),
        });
        heap.push(BackwardFrontierState {
            priority: 2.0,
            cumulative_cost: 2.0,
            node: NodeId(0),
        });
        let first = heap.pop().unwrap();
        assert_eq!(first.node, NodeId(0));
    }
}
