//! Public facade: [`RouteCore`] ties the graph, profiles, overlay, and
//! planners together behind the request/response types external callers
//! use (spec §3, §5).

use crate::config::RouteCoreConfig;
use crate::cost::CostEngine;
use crate::error::{TaroError, TaroResult};
use crate::graph::EdgeGraph;
use crate::heuristic::{GoalBoundHeuristic, HeuristicType, LandmarkStore};
use crate::ident::NodeId;
use crate::overlay::LiveOverlay;
use crate::planner_astar::BidirectionalTdAStarPlanner;
use crate::planner_matrix::{dedupe_node_ids, MatrixRow, OneToManyMatrixPlanner};
use crate::profile::ProfileStore;
use crate::query_context::{MatrixQueryContext, PlannerQueryContext};
use crate::reverse_index::ReverseEdgeIndex;
use crate::temporal::ResolvedTemporalContext;
use crate::tick::Tick;
use crate::transition::ResolvedTransitionContext;
use crate::turn::TurnCostMap;

/// Which search algorithm a request should use (spec §6).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Algorithm {
    /// Plain Dijkstra; only compatible with [`HeuristicType::None`].
    Dijkstra,
    /// Bidirectional time-dependent A*.
    AStar,
}

/// Maps external identifiers (strings from a caller-facing API) to
/// internal [`NodeId`]s. Implemented outside this crate by whatever
/// owns the id namespace; kept as a trait so the core never assumes a
/// specific id encoding (spec §5, §6).
pub trait IdMapper {
    /// Resolves an external id to an internal [`NodeId`].
    fn resolve(&self, external_id: &str) -> TaroResult<NodeId>;
}

/// A single point-to-point route request.
#[derive(Clone, Debug)]
pub struct RouteRequest {
    /// External source id.
    pub source: String,
    /// External goal id.
    pub goal: String,
    /// Departure tick.
    pub departure_tick: Tick,
    /// Algorithm to run.
    pub algorithm: Algorithm,
    /// Heuristic to use; must be [`HeuristicType::None`] for
    /// [`Algorithm::Dijkstra`].
    pub heuristic: HeuristicType,
    /// Whether turn penalties apply (edge-based transitions).
    pub transition_context: ResolvedTransitionContext,
}

/// The outcome of a [`RouteRequest`] (spec §6): a flattened, canonical
/// shape rather than a thin wrapper over [`RoutePlan`], so an
/// unreachable goal is reported as data (`reachable = false`) instead of
/// only as an error.
#[derive(Clone, Debug)]
pub struct RouteResponse {
    /// Whether the goal was reached.
    pub reachable: bool,
    /// The request's departure tick, echoed back.
    pub departure_ticks: Tick,
    /// Arrival tick at the goal; the departure tick when unreachable.
    pub arrival_ticks: Tick,
    /// Total cost in seconds; `+inf` when unreachable.
    pub total_cost: f64,
    /// Labels settled while solving this request.
    pub settled_states: u64,
    /// Algorithm the request asked for.
    pub algorithm: Algorithm,
    /// Heuristic type the request asked for.
    pub heuristic_type: HeuristicType,
    /// Nodes traversed, source to goal; empty when unreachable.
    pub node_path: Vec<NodeId>,
}

/// A one-to-many matrix request: one source against many destinations.
#[derive(Clone, Debug)]
pub struct MatrixRequest {
    /// External source ids, one row per id.
    pub sources: Vec<String>,
    /// External destination ids, shared across all rows.
    pub destinations: Vec<String>,
    /// Departure tick, shared across all rows.
    pub departure_tick: Tick,
    /// Algorithm to run; only [`Algorithm::Dijkstra`] combined with
    /// [`HeuristicType::None`] or [`Algorithm::AStar`] is accepted (spec
    /// §4.5).
    pub algorithm: Algorithm,
    /// Heuristic to use for the pairwise fallback path; the native sweep
    /// ignores this (spec §4.5).
    pub heuristic: HeuristicType,
    /// Whether turn penalties apply.
    pub transition_context: ResolvedTransitionContext,
}

/// Execution stats aggregated across every row of a [`MatrixResponse`]
/// (spec §4.5's "request totals"): settled states summed across rows,
/// and the peak per-row label/frontier sizes observed anywhere in the
/// request.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixRequestStats {
    /// Sum of every row's settled-state count.
    pub settled: u64,
    /// Largest label-arena peak observed across all rows.
    pub label_peak: u64,
    /// Largest frontier peak observed across all rows.
    pub frontier_peak: u64,
}

/// The outcome of a [`MatrixRequest`]: one [`MatrixRow`] per (deduped)
/// source, each containing one entry per (deduped) destination, plus
/// request-level execution stats.
#[derive(Clone, Debug)]
pub struct MatrixResponse {
    /// Deduplicated source node ids, in first-occurrence order.
    pub sources: Vec<NodeId>,
    /// Deduplicated destination node ids, in first-occurrence order.
    pub destinations: Vec<NodeId>,
    /// One row per entry in `sources`.
    pub rows: Vec<MatrixRow>,
    /// Stats aggregated across all rows.
    pub stats: MatrixRequestStats,
}

/// Owns the immutable graph/profile data, the live overlay, and runtime
/// configuration, and dispatches route/matrix requests against them.
pub struct RouteCore {
    graph: EdgeGraph,
    profiles: ProfileStore,
    reverse_index: ReverseEdgeIndex,
    turns: Option<TurnCostMap>,
    overlay: LiveOverlay,
    temporal_context: ResolvedTemporalContext,
    config: RouteCoreConfig,
}

impl RouteCore {
    /// Constructs a `RouteCore`, validating the bucket-size
    /// configuration and building the reverse-edge index once up front.
    pub fn new(
        graph: EdgeGraph,
        profiles: ProfileStore,
        turns: Option<TurnCostMap>,
        temporal_context: ResolvedTemporalContext,
        config: RouteCoreConfig,
    ) -> TaroResult<Self> {
        ProfileStore::validate_bucket_size(config.bucket_size_seconds)?;
        let reverse_index = ReverseEdgeIndex::build(&graph, &profiles);
        let overlay = LiveOverlay::new(
            config.max_live_overrides,
            config.overlay_capacity_policy,
            config.overlay_cleanup_on_read,
        );
        Ok(Self {
            graph,
            profiles,
            reverse_index,
            turns,
            overlay,
            temporal_context,
            config,
        })
    }

    /// Returns the live-traffic overlay for direct batch-apply/sweep
    /// access (spec §4.1).
    #[must_use]
    pub fn live_overlay(&self) -> &LiveOverlay {
        &self.overlay
    }

    /// Returns the bound graph.
    #[must_use]
    pub fn graph(&self) -> &EdgeGraph {
        &self.graph
    }

    /// Explains the transition cost of traversing `edge` at `entry_tick`,
    /// optionally preceded by `from_edge`. Thin wrapper over
    /// [`CostEngine::explain_edge_cost`] bound to this core's stores, for
    /// diagnostics tooling outside this crate.
    #[must_use]
    pub fn explain_edge(
        &self,
        edge: crate::ident::EdgeId,
        entry_tick: Tick,
        from_edge: Option<crate::ident::EdgeId>,
    ) -> crate::cost::CostBreakdown {
        self.cost_engine().explain_edge_cost(edge, entry_tick, from_edge)
    }

    fn cost_engine(&self) -> CostEngine<'_> {
        CostEngine::new(
            &self.graph,
            &self.profiles,
            Some(&self.overlay),
            self.turns.as_ref(),
            &self.temporal_context,
            self.config.time_unit,
            self.config.bucket_size_seconds,
            self.config.sampling_policy,
        )
    }

    /// Resolves and runs a single point-to-point route request.
    pub fn route(
        &self,
        request: &RouteRequest,
        id_mapper: &dyn IdMapper,
        landmarks: Option<&dyn LandmarkStore>,
        ctx: &mut PlannerQueryContext,
    ) -> TaroResult<RouteResponse> {
        if request.algorithm == Algorithm::Dijkstra && request.heuristic != HeuristicType::None {
            return Err(TaroError::AlgorithmHeuristicMismatch {
                algorithm: "Dijkstra",
                heuristic: "non-None",
            });
        }
        let source = id_mapper.resolve(&request.source)?;
        let goal = id_mapper.resolve(&request.goal)?;
        let heuristic = GoalBoundHeuristic::resolve(
            request.heuristic,
            &self.graph,
            &self.profiles,
            goal,
            landmarks,
        )?;
        let cost_engine = self.cost_engine();
        let planner = BidirectionalTdAStarPlanner::new(
            &self.graph,
            &self.reverse_index,
            self.turns.as_ref(),
            request.transition_context,
            self.config.search_budget,
        );
        let result = planner.search(source, goal, request.departure_tick, &cost_engine, &heuristic, ctx);
        match result {
            Ok(plan) => Ok(RouteResponse {
                reachable: true,
                departure_ticks: request.departure_tick,
                arrival_ticks: plan.arrival_tick,
                total_cost: plan.total_cost,
                settled_states: ctx.counters.settled,
                algorithm: request.algorithm,
                heuristic_type: request.heuristic,
                node_path: plan.node_path,
            }),
            Err(TaroError::RouteUnreachable { .. }) => Ok(RouteResponse {
                reachable: false,
                departure_ticks: request.departure_tick,
                arrival_ticks: request.departure_tick,
                total_cost: f64::INFINITY,
                settled_states: ctx.counters.settled,
                algorithm: request.algorithm,
                heuristic_type: request.heuristic,
                node_path: Vec::new(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Resolves and runs a one-to-many matrix request across every
    /// (deduplicated) source row.
    pub fn matrix(
        &self,
        request: &MatrixRequest,
        id_mapper: &dyn IdMapper,
        landmarks: Option<&dyn LandmarkStore>,
        matrix_ctx: &mut MatrixQueryContext,
        planner_ctx: &mut PlannerQueryContext,
    ) -> TaroResult<MatrixResponse> {
        if request.algorithm == Algorithm::Dijkstra && request.heuristic != HeuristicType::None {
            return Err(TaroError::AlgorithmHeuristicMismatch {
                algorithm: "Dijkstra",
                heuristic: "non-None",
            });
        }
        let source_ids: Vec<NodeId> = request
            .sources
            .iter()
            .map(|s| id_mapper.resolve(s))
            .collect::<TaroResult<_>>()?;
        let destination_ids: Vec<NodeId> = request
            .destinations
            .iter()
            .map(|s| id_mapper.resolve(s))
            .collect::<TaroResult<_>>()?;
        let sources = dedupe_node_ids(&source_ids);
        let destinations = dedupe_node_ids(&destination_ids);

        let cost_engine = self.cost_engine();
        let matrix_planner = OneToManyMatrixPlanner::new(
            &self.graph,
            &self.reverse_index,
            self.turns.as_ref(),
            request.transition_context,
            self.config.matrix_budget,
            self.config.termination_policy,
        );
        let heuristic_type = request.heuristic;
        let graph = &self.graph;
        let profiles = &self.profiles;
        let heuristic_for = move |goal: NodeId| -> Box<dyn crate::heuristic::HeuristicProvider> {
            GoalBoundHeuristic::resolve(heuristic_type, graph, profiles, goal, landmarks)
                .map_or_else(
                    |_| Box::new(GoalBoundHeuristic::None) as Box<dyn crate::heuristic::HeuristicProvider>,
                    |h| Box::new(h) as Box<dyn crate::heuristic::HeuristicProvider>,
                )
        };

        let mut rows = Vec::with_capacity(sources.len());
        let mut stats = MatrixRequestStats::default();
        for &source in &sources {
            let row = matrix_planner.solve_row(
                source,
                &destinations,
                request.departure_tick,
                &cost_engine,
                &heuristic_for,
                matrix_ctx,
                planner_ctx,
            )?;
            stats.settled += row.stats.settled;
            stats.label_peak = stats.label_peak.max(row.stats.label_peak);
            stats.frontier_peak = stats.frontier_peak.max(row.stats.frontier_peak);
            rows.push(row);
        }

        Ok(MatrixResponse {
            sources,
            destinations,
            rows,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::ident::ProfileId;
    use crate::profile::Profile;
    use crate::tick::EngineTimeUnit;
    use std::collections::HashMap;

    struct MapMapper(HashMap<String, NodeId>);
    impl IdMapper for MapMapper {
        fn resolve(&self, external_id: &str) -> TaroResult<NodeId> {
            self.0
                .get(external_id)
                .copied()
                .ok_or_else(|| TaroError::UnknownId(external_id.to_owned()))
        }
    }

    fn chain_core() -> (RouteCore, MapMapper) {
        let graph = EdgeGraph::new(
            vec![0, 1, 2, 3, 3],
            vec![NodeId(1), NodeId(2), NodeId(3)],
            vec![NodeId(0), NodeId(1), NodeId(2)],
            vec![1.0, 1.0, 1.0],
            vec![ProfileId(0); 3],
            None,
        )
        .unwrap();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let mut config = RouteCoreConfig::default();
        config.time_unit = EngineTimeUnit::Seconds;
        let core = RouteCore::new(graph, profiles, None, ResolvedTemporalContext::Linear, config).unwrap();
        let mut map = HashMap::new();
        map.insert("a".to_owned(), NodeId(0));
        map.insert("b".to_owned(), NodeId(1));
        map.insert("d".to_owned(), NodeId(3));
        (core, MapMapper(map))
    }

    #[test]
    fn route_resolves_ids_and_finds_path() {
        let (core, mapper) = chain_core();
        let request = RouteRequest {
            source: "a".to_owned(),
            goal: "d".to_owned(),
            departure_tick: 0,
            algorithm: Algorithm::AStar,
            heuristic: HeuristicType::None,
            transition_context: ResolvedTransitionContext::NodeBased,
        };
        let mut ctx = PlannerQueryContext::new();
        let response = core.route(&request, &mapper, None, &mut ctx).unwrap();
        assert!(response.reachable);
        assert!((response.total_cost - 3.0).abs() < 1e-9);
        assert_eq!(response.node_path, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn route_rejects_dijkstra_with_heuristic() {
        let (core, mapper) = chain_core();
        let request = RouteRequest {
            source: "a".to_owned(),
            goal: "d".to_owned(),
            departure_tick: 0,
            algorithm: Algorithm::Dijkstra,
            heuristic: HeuristicType::Spherical,
            transition_context: ResolvedTransitionContext::NodeBased,
        };
        let mut ctx = PlannerQueryContext::new();
        let result = core.route(&request, &mapper, None, &mut ctx);
        assert!(result.is_err());
    }

    #[test]
    fn route_reports_unknown_id() {
        let (core, mapper) = chain_core();
        let request = RouteRequest {
            source: "zzz".to_owned(),
            goal: "d".to_owned(),
            departure_tick: 0,
            algorithm: Algorithm::AStar,
            heuristic: HeuristicType::None,
            transition_context: ResolvedTransitionContext::NodeBased,
        };
        let mut ctx = PlannerQueryContext::new();
        let result = core.route(&request, &mapper, None, &mut ctx);
        assert!(matches!(result, Err(TaroError::UnknownId(_))));
    }

    #[test]
    fn matrix_dedupes_and_returns_one_row_per_distinct_source() {
        let (core, mapper) = chain_core();
        let request = MatrixRequest {
            sources: vec!["a".to_owned(), "a".to_owned()],
            destinations: vec!["b".to_owned(), "d".to_owned(), "b".to_owned()],
            departure_tick: 0,
            algorithm: Algorithm::Dijkstra,
            heuristic: HeuristicType::None,
            transition_context: ResolvedTransitionContext::NodeBased,
        };
        let mut matrix_ctx = MatrixQueryContext::new();
        let mut planner_ctx = PlannerQueryContext::new();
        let response = core
            .matrix(&request, &mapper, None, &mut matrix_ctx, &mut planner_ctx)
            .unwrap();
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.destinations.len(), 2);
        assert_eq!(response.rows.len(), 1);
        assert!(response.rows[0].destinations[1].reachable);
        assert!((response.rows[0].destinations[1].total_cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn matrix_rejects_dijkstra_with_heuristic() {
        let (core, mapper) = chain_core();
        let request = MatrixRequest {
            sources: vec!["a".to_owned()],
            destinations: vec!["d".to_owned()],
            departure_tick: 0,
            algorithm: Algorithm::Dijkstra,
            heuristic: HeuristicType::Spherical,
            transition_context: ResolvedTransitionContext::NodeBased,
        };
        let mut matrix_ctx = MatrixQueryContext::new();
        let mut planner_ctx = PlannerQueryContext::new();
        let result = core.matrix(&request, &mapper, None, &mut matrix_ctx, &mut planner_ctx);
        assert!(result.is_err());
    }
}
