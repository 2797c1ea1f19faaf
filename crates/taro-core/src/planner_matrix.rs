//! One-to-many matrix planning (spec §4.5).
//!
//! For a small destination set the per-request cost of a native
//! one-to-many sweep can exceed the cost of just running pairwise
//! point-to-point searches (each with the benefit of a goal-directed
//! heuristic); above [`crate::budget::TerminationPolicy`]'s threshold the
//! native sweep amortizes better. Both paths are exposed through the
//! same [`OneToManyMatrixPlanner::solve_row`] entry point so callers
//! never see which strategy ran.

use crate::budget::{MatrixBudget, TerminationPolicy};
use crate::cost::CostEngine;
use crate::error::{TaroError, TaroResult};
use crate::frontier::ForwardFrontierState;
use crate::graph::EdgeGraph;
use crate::heuristic::HeuristicProvider;
use crate::ident::{LabelId, NodeId};
use crate::path_evaluator::PathEvaluator;
use crate::query_context::MatrixQueryContext;
use crate::reverse_index::ReverseEdgeIndex;
use crate::tick::Tick;
use crate::transition::ResolvedTransitionContext;
use crate::turn::TurnCostMap;
use crate::planner_astar::BidirectionalTdAStarPlanner;
use crate::query_context::PlannerQueryContext;

/// One destination cell of a matrix row (spec §4.5 step 4). Unreachable
/// cells are canonicalized rather than represented as an error:
/// `reachable=false`, `total_cost=+inf`, `arrival_tick=departure_ticks`.
#[derive(Clone, Copy, Debug)]
pub struct MatrixCell {
    /// Whether the destination was reached.
    pub reachable: bool,
    /// Total cost in seconds; `+inf` when unreachable.
    pub total_cost: f64,
    /// Arrival tick; the row's departure tick when unreachable.
    pub arrival_tick: Tick,
}

impl MatrixCell {
    fn unreachable(departure_tick: Tick) -> Self {
        Self {
            reachable: false,
            total_cost: f64::INFINITY,
            arrival_tick: departure_tick,
        }
    }

    fn reached(total_cost: f64, arrival_tick: Tick) -> Self {
        Self {
            reachable: true,
            total_cost,
            arrival_tick,
        }
    }
}

/// Execution stats for one matrix row (spec §4.5's "per-row
/// work/settled/label-peak/frontier-peak").
#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixRowStats {
    /// Labels settled while solving this row.
    pub settled: u64,
    /// Peak number of labels held in the row's label arena.
    pub label_peak: u64,
    /// Peak combined frontier size observed while solving this row.
    pub frontier_peak: u64,
}

/// One row of a matrix result: the cell (reachable or not) for each
/// requested destination, in request order, plus this row's execution
/// stats.
#[derive(Clone, Debug)]
pub struct MatrixRow {
    /// One entry per requested destination.
    pub destinations: Vec<MatrixCell>,
    /// This row's execution stats.
    pub stats: MatrixRowStats,
}

/// Deduplicates source/destination node ids so a matrix request with
/// repeated nodes only pays for distinct searches (spec §4.5's
/// dedup-on-distinct-node-ids seed scenario).
#[must_use]
pub fn dedupe_node_ids(ids: &[NodeId]) -> Vec<NodeId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        if seen.insert(id) {
            out.push(id);
        }
    }
    out
}

/// One-to-many planner: native Dijkstra/A* sweep, or batched pairwise
/// fallback above the configured destination-count threshold.
pub struct OneToManyMatrixPlanner<'a> {
    graph: &'a EdgeGraph,
    reverse_index: &'a ReverseEdgeIndex,
    turns: Option<&'a TurnCostMap>,
    transition_context: ResolvedTransitionContext,
    budget: MatrixBudget,
    termination_policy: TerminationPolicy,
}

impl<'a> OneToManyMatrixPlanner<'a> {
    /// Constructs a matrix planner over the given graph/reverse-index.
    #[must_use]
    pub fn new(
        graph: &'a EdgeGraph,
        reverse_index: &'a ReverseEdgeIndex,
        turns: Option<&'a TurnCostMap>,
        transition_context: ResolvedTransitionContext,
        budget: MatrixBudget,
        termination_policy: TerminationPolicy,
    ) -> Self {
        Self {
            graph,
            reverse_index,
            turns,
            transition_context,
            budget,
            termination_policy,
        }
    }

    /// Solves one source row against `destinations`, departing at
    /// `departure_tick`. Chooses between the native one-to-many sweep
    /// and the batched pairwise fallback per [`TerminationPolicy`].
    pub fn solve_row(
        &self,
        source: NodeId,
        destinations: &[NodeId],
        departure_tick: Tick,
        cost_engine: &CostEngine<'_>,
        heuristic_for: &dyn Fn(NodeId) -> Box<dyn HeuristicProvider + 'a>,
        ctx: &mut MatrixQueryContext,
        planner_ctx: &mut PlannerQueryContext,
    ) -> TaroResult<MatrixRow> {
        if self.termination_policy.should_use_pairwise_fallback(destinations.len()) {
            self.solve_row_pairwise(source, destinations, departure_tick, cost_engine, heuristic_for, planner_ctx, ctx)
        } else {
            self.solve_row_native(source, destinations, departure_tick, cost_engine, ctx)
        }
    }

    fn solve_row_pairwise(
        &self,
        source: NodeId,
        destinations: &[NodeId],
        departure_tick: Tick,
        cost_engine: &CostEngine<'_>,
        heuristic_for: &dyn Fn(NodeId) -> Box<dyn HeuristicProvider + 'a>,
        planner_ctx: &mut PlannerQueryContext,
        ctx: &mut MatrixQueryContext,
    ) -> TaroResult<MatrixRow> {
        let planner = BidirectionalTdAStarPlanner::new(
            self.graph,
            self.reverse_index,
            self.turns,
            self.transition_context,
            crate::budget::SearchBudget {
                max_settled: self.budget.max_row_work,
                max_labels: self.budget.max_row_labels,
                max_frontier_size: self.budget.max_row_frontier,
            },
        );
        let mut results = Vec::with_capacity(destinations.len());
        let mut stats = MatrixRowStats::default();
        for &goal in destinations {
            if goal == source {
                results.push(MatrixCell::reached(0.0, departure_tick));
                continue;
            }
            let heuristic = heuristic_for(goal);
            let result = planner.search(source, goal, departure_tick, cost_engine, heuristic.as_ref(), planner_ctx);
            stats.settled += planner_ctx.counters.settled;
            stats.label_peak = stats.label_peak.max(planner_ctx.counters.labels);
            stats.frontier_peak = stats.frontier_peak.max(planner_ctx.counters.frontier_size);
            ctx.request_work += planner_ctx.counters.settled;
            self.budget.check_request(ctx.request_work)?;
            match result {
                Ok(plan) => results.push(MatrixCell::reached(plan.total_cost, plan.arrival_tick)),
                Err(TaroError::RouteUnreachable { .. }) => {
                    results.push(MatrixCell::unreachable(departure_tick));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(MatrixRow {
            destinations: results,
            stats,
        })
    }

    fn solve_row_native(
        &self,
        source: NodeId,
        destinations: &[NodeId],
        departure_tick: Tick,
        cost_engine: &CostEngine<'_>,
        ctx: &mut MatrixQueryContext,
    ) -> TaroResult<MatrixRow> {
        ctx.reset_row();

        let mut best_cost: std::collections::HashMap<NodeId, f64, rustc_hash::FxBuildHasher> =
            std::collections::HashMap::default();
        let mut best_label: std::collections::HashMap<NodeId, LabelId, rustc_hash::FxBuildHasher> =
            std::collections::HashMap::default();
        let mut stats = MatrixRowStats::default();

        best_cost.insert(source, 0.0);

        for edge in self.graph.out_edges(source) {
            let cost = cost_engine.compute_edge_cost(edge, departure_tick, None);
            if !cost.is_finite() {
                continue;
            }
            let arrival = crate::tick::advance_saturating(departure_tick, cost);
            let Some(label) = ctx.labels.try_insert(edge, arrival, cost, LabelId::NONE) else {
                continue;
            };
            ctx.open.push(ForwardFrontierState {
                priority: cost,
                cumulative_cost: cost,
                edge,
                arrival_tick: arrival,
                label,
            });
            ctx.row_counters.labels += 1;
            stats.label_peak = stats.label_peak.max(ctx.row_counters.labels);
        }

        let targets: std::collections::HashSet<NodeId> = destinations.iter().copied().collect();
        let mut remaining = targets.len();

        while remaining > 0 {
            let Some(top) = ctx.open.pop() else { break };
            ctx.row_counters.settled += 1;
            ctx.row_counters.frontier_size = ctx.open.len() as u64;
            self.budget.check_row(ctx.row_counters)?;
            stats.frontier_peak = stats.frontier_peak.max(ctx.row_counters.frontier_size);

            let node = self.graph.destination(top.edge);
            let recorded = best_cost.get(&node).copied().unwrap_or(f64::INFINITY);
            if top.cumulative_cost >= recorded {
                continue;
            }
            best_cost.insert(node, top.cumulative_cost);
            best_label.insert(node, top.label);
            if targets.contains(&node) {
                remaining -= 1;
            }

            for next_edge in self.graph.out_edges(node) {
                if let Some(turns) = self.turns {
                    if turns.is_forbidden(top.edge, next_edge) {
                        continue;
                    }
                }
                let from_edge = self
                    .transition_context
                    .applies_turn_penalties()
                    .then_some(top.edge);
                let cost = cost_engine.compute_edge_cost(next_edge, top.arrival_tick, from_edge);
                if !cost.is_finite() {
                    continue;
                }
                let cumulative = top.cumulative_cost + cost;
                let dest = self.graph.destination(next_edge);
                let existing = best_cost.get(&dest).copied().unwrap_or(f64::INFINITY);
                if cumulative >= existing {
                    continue;
                }
                let arrival = crate::tick::advance_saturating(top.arrival_tick, cost);
                let Some(label) = ctx.labels.try_insert(next_edge, arrival, cumulative, top.label) else {
                    continue;
                };
                ctx.row_counters.labels += 1;
                stats.label_peak = stats.label_peak.max(ctx.row_counters.labels);
                ctx.open.push(ForwardFrontierState {
                    priority: cumulative,
                    cumulative_cost: cumulative,
                    edge: next_edge,
                    arrival_tick: arrival,
                    label,
                });
            }
        }

        stats.settled = ctx.row_counters.settled;
        ctx.request_work += ctx.row_counters.settled;
        self.budget.check_request(ctx.request_work)?;

        let evaluator = PathEvaluator::new(self.graph);
        let mut row = Vec::with_capacity(destinations.len());
        for &dest in destinations {
            if dest == source {
                row.push(MatrixCell::reached(0.0, departure_tick));
                continue;
            }
            let cell = best_label.get(&dest).map_or_else(
                || MatrixCell::unreachable(departure_tick),
                |&label| {
                    let reconstructed = evaluator.reconstruct(&ctx.labels, label);
                    MatrixCell::reached(best_cost[&dest], reconstructed.arrival_tick)
                },
            );
            row.push(cell);
        }
        Ok(MatrixRow { destinations: row, stats })
    }
}
