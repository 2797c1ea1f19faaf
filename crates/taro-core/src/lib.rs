// SPDX-License-Identifier: Apache-2.0
//! taro-core: time-dependent road-network routing engine core.
//!
//! This crate owns the immutable graph and temporal-profile data, a
//! bounded live-traffic overlay, and the point-to-point and one-to-many
//! planners that answer routing queries against them. Loading a compiled
//! graph/profile pair from an on-disk format, the external id namespace,
//! and timezone/DST resolution are all external collaborators reached
//! through the traits in [`route_core`] and [`heuristic`]; this crate
//! only consumes the resolved results.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cognitive_complexity,
    clippy::option_if_let_else,
    clippy::significant_drop_tightening,
    clippy::doc_markdown,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::too_long_first_doc_paragraph,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::similar_names,
    clippy::trivially_copy_pass_by_ref,
    clippy::needless_collect,
    clippy::manual_let_else,
    clippy::needless_pass_by_value,
    clippy::multiple_crate_versions
)]

pub mod budget;
pub mod config;
pub mod cost;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod heuristic;
pub mod ident;
pub mod label;
pub mod overlay;
pub mod path_evaluator;
pub mod planner_astar;
pub mod planner_matrix;
pub mod profile;
pub mod query_context;
pub mod reverse_index;
pub mod route_core;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod temporal;
pub mod tick;
pub mod transition;
pub mod turn;

pub use budget::{BudgetCounters, MatrixBudget, SearchBudget, TerminationPolicy};
pub use config::RouteCoreConfig;
pub use cost::{CostBreakdown, CostEngine, TemporalSamplingPolicy};
pub use error::{TaroError, TaroResult};
pub use graph::{Coord, EdgeGraph};
pub use heuristic::{GoalBoundHeuristic, HeuristicProvider, HeuristicType, LandmarkStore};
pub use ident::{EdgeId, LabelId, NodeId, ProfileId};
pub use overlay::{BatchApplyResult, CapacityPolicy, LiveLookup, LiveOverlay, LiveUpdate};
pub use planner_astar::{BidirectionalTdAStarPlanner, RoutePlan};
pub use planner_matrix::{MatrixCell, MatrixRow, MatrixRowStats, OneToManyMatrixPlanner};
pub use profile::{Profile, ProfileStore};
pub use query_context::{MatrixQueryContext, PlannerQueryContext};
pub use reverse_index::ReverseEdgeIndex;
pub use route_core::{
    Algorithm, IdMapper, MatrixRequest, MatrixRequestStats, MatrixResponse, RouteCore,
    RouteRequest, RouteResponse,
};
pub use temporal::{BucketPosition, ResolvedTemporalContext};
pub use tick::{EngineTimeUnit, Tick};
pub use transition::ResolvedTransitionContext;
pub use turn::TurnCostMap;
