//! Path replay and reconstruction (spec §4.4 step 8).
//!
//! Given a goal label, walks its predecessor chain back to a source
//! label, producing an edge path in traversal order, and can replay that
//! path against a [`crate::cost::CostEngine`] to verify the reported
//! cost and detect stitching errors.

use crate::cost::CostEngine;
use crate::error::{TaroError, TaroResult};
use crate::graph::EdgeGraph;
use crate::ident::{EdgeId, LabelId, NodeId};
use crate::label::DominanceLabelStore;
use crate::tick::Tick;
use crate::transition::ResolvedTransitionContext;
use crate::turn::TurnCostMap;

/// A reconstructed path: the ordered edges traversed and the arrival
/// tick at the final edge.
#[derive(Clone, Debug)]
pub struct ReconstructedPath {
    /// Edges in traversal order, source to goal.
    pub edges: Vec<EdgeId>,
    /// Arrival tick at the last edge in `edges`.
    pub arrival_tick: Tick,
    /// Cumulative cost reported by the label chain.
    pub reported_cost: f64,
}

/// Replays and reconstructs paths from a [`DominanceLabelStore`].
pub struct PathEvaluator<'a> {
    graph: &'a EdgeGraph,
}

impl<'a> PathEvaluator<'a> {
    /// Creates an evaluator bound to `graph`, used to validate
    /// edge-to-edge stitching during replay.
    #[must_use]
    pub fn new(graph: &'a EdgeGraph) -> Self {
        Self { graph }
    }

    /// Walks the predecessor chain from `goal_label` back to a source
    /// label (one whose predecessor is [`LabelId::NONE`]), returning the
    /// edges in source-to-goal order.
    #[must_use]
    pub fn reconstruct(&self, labels: &DominanceLabelStore, goal_label: LabelId) -> ReconstructedPath {
        let mut edges = Vec::new();
        let mut current = goal_label;
        loop {
            let label = labels.get(current);
            edges.push(label.edge);
            if label.predecessor.is_none() {
                let arrival_tick = labels.get(goal_label).arrival_tick;
                let reported_cost = labels.get(goal_label).cumulative_cost;
                edges.reverse();
                return ReconstructedPath {
                    edges,
                    arrival_tick,
                    reported_cost,
                };
            }
            current = label.predecessor;
        }
    }

    /// Replays `path` against `cost_engine` starting from `start_tick`,
    /// verifying that each edge's origin matches the previous edge's
    /// destination and that every transition cost is finite. `turns` and
    /// `transition_context` are the same inputs the planner searched
    /// with, so a forbidden turn is rejected in both modes while a
    /// finite turn penalty is only charged under [`ResolvedTransitionContext::EdgeBased`]
    /// (spec §4.3), matching the cost the planner itself accumulated.
    ///
    /// Returns [`TaroError::ReconstructionMismatch`] on a stitching
    /// error, or [`TaroError::NonFiniteReplayCost`] if a blocked or
    /// forbidden transition is encountered (a path should never have
    /// been reported as feasible if this happens; it indicates a
    /// planner/cost-engine contract violation).
    pub fn replay(
        &self,
        path: &[EdgeId],
        start_tick: Tick,
        cost_engine: &CostEngine<'_>,
        turns: Option<&TurnCostMap>,
        transition_context: ResolvedTransitionContext,
    ) -> TaroResult<(Tick, f64, Vec<NodeId>)> {
        let mut tick = start_tick;
        let mut cumulative = 0.0_f64;
        let mut nodes = Vec::with_capacity(path.len() + 1);
        let mut previous_edge: Option<EdgeId> = None;

        for &edge in path {
            if let Some(prev) = previous_edge {
                let expected = self.graph.destination(prev);
                let found = self.graph.origin(edge);
                if expected != found {
                    return Err(TaroError::ReconstructionMismatch {
                        edge,
                        expected,
                        found,
                    });
                }
                if let Some(turns) = turns {
                    if turns.is_forbidden(prev, edge) {
                        return Err(TaroError::NonFiniteReplayCost);
                    }
                }
            } else {
                nodes.push(self.graph.origin(edge));
            }
            let from_edge = if transition_context.applies_turn_penalties() {
                previous_edge
            } else {
                None
            };
            let cost = cost_engine.compute_edge_cost(edge, tick, from_edge);
            if !cost.is_finite() {
                return Err(TaroError::NonFiniteReplayCost);
            }
            cumulative += cost;
            tick = crate::tick::advance_saturating(tick, cost);
            nodes.push(self.graph.destination(edge));
            previous_edge = Some(edge);
        }

        Ok((tick, cumulative, nodes))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::cost::TemporalSamplingPolicy;
    use crate::ident::ProfileId;
    use crate::profile::{Profile, ProfileStore};
    use crate::temporal::ResolvedTemporalContext;
    use crate::tick::EngineTimeUnit;

    fn chain_graph() -> EdgeGraph {
        EdgeGraph::new(
            vec![0, 1, 2, 2],
            vec![NodeId(1), NodeId(2)],
            vec![NodeId(0), NodeId(1)],
            vec![5.0, 7.0],
            vec![ProfileId(0), ProfileId(0)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn reconstruct_walks_predecessor_chain_in_order() {
        let mut labels = DominanceLabelStore::new();
        let first = labels.push(EdgeId(0), 5, 5.0, LabelId::NONE);
        let second = labels.push(EdgeId(1), 12, 12.0, first);
        let graph = chain_graph();
        let evaluator = PathEvaluator::new(&graph);
        let path = evaluator.reconstruct(&labels, second);
        assert_eq!(path.edges, vec![EdgeId(0), EdgeId(1)]);
        assert_eq!(path.arrival_tick, 12);
    }

    #[test]
    fn replay_detects_origin_mismatch() {
        let graph = EdgeGraph::new(
            vec![0, 1, 2, 2, 2],
            vec![NodeId(1), NodeId(3)],
            vec![NodeId(0), NodeId(2)],
            vec![1.0, 1.0],
            vec![ProfileId(0), ProfileId(0)],
            None,
        )
        .unwrap();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let engine = CostEngine::new(
            &graph,
            &profiles,
            None,
            None,
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        let evaluator = PathEvaluator::new(&graph);
        let result = evaluator.replay(
            &[EdgeId(0), EdgeId(1)],
            0,
            &engine,
            None,
            ResolvedTransitionContext::NodeBased,
        );
        assert!(matches!(result, Err(TaroError::ReconstructionMismatch { .. })));
    }

    #[test]
    fn replay_accumulates_cost_and_ticks() {
        let graph = chain_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let engine = CostEngine::new(
            &graph,
            &profiles,
            None,
            None,
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        let evaluator = PathEvaluator::new(&graph);
        let (tick, cost, nodes) = evaluator
            .replay(
                &[EdgeId(0), EdgeId(1)],
                0,
                &engine,
                None,
                ResolvedTransitionContext::NodeBased,
            )
            .unwrap();
        assert_eq!(tick, 12);
        assert!((cost - 12.0).abs() < 1e-9);
        assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn replay_rejects_forbidden_turn_in_either_mode() {
        let graph = chain_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let turns = crate::turn::TurnCostMap::new([(EdgeId(0), EdgeId(1), crate::turn::FORBIDDEN)]);
        let engine = CostEngine::new(
            &graph,
            &profiles,
            None,
            Some(&turns),
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        let evaluator = PathEvaluator::new(&graph);
        let node_based = evaluator.replay(
            &[EdgeId(0), EdgeId(1)],
            0,
            &engine,
            Some(&turns),
            ResolvedTransitionContext::NodeBased,
        );
        assert!(matches!(node_based, Err(TaroError::NonFiniteReplayCost)));
        let edge_based = evaluator.replay(
            &[EdgeId(0), EdgeId(1)],
            0,
            &engine,
            Some(&turns),
            ResolvedTransitionContext::EdgeBased,
        );
        assert!(matches!(edge_based, Err(TaroError::NonFiniteReplayCost)));
    }
}
