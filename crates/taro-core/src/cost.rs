//! Edge cost evaluation (spec §4.2): combines base weight, the temporal
//! profile multiplier, an optional live-overlay speed factor, and an
//! optional turn penalty into a single transition cost in seconds.

use crate::graph::EdgeGraph;
use crate::ident::EdgeId;
use crate::overlay::{LiveLookup, LiveOverlay};
use crate::profile::ProfileStore;
use crate::temporal::ResolvedTemporalContext;
use crate::tick::{EngineTimeUnit, Tick};
use crate::turn::TurnCostMap;

/// How a profile's fractional bucket position is used when sampling the
/// multiplier curve (spec §4.2 step 2, Open Question resolved in
/// supplementary spec).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TemporalSamplingPolicy {
    /// Use the bucket the entry tick falls in verbatim, no interpolation.
    Discrete,
    /// Linearly interpolate between the current bucket and the next.
    Interpolated,
}

/// A detailed breakdown of how a single edge's transition cost at a
/// given entry tick was computed, for diagnostics (spec §4.2,
/// `explain_edge_cost`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostBreakdown {
    /// The edge's static base weight.
    pub base_weight: f32,
    /// The temporal multiplier sampled from the edge's profile.
    pub temporal_multiplier: f32,
    /// The live-overlay speed factor applied, if any (`1.0` if absent).
    pub live_speed_factor: f32,
    /// Whether the live overlay reported the edge as blocked.
    pub live_blocked: bool,
    /// The additive turn penalty charged entering this edge from the
    /// predecessor edge, if edge-based transitions are in effect.
    pub turn_penalty: f32,
    /// The final transition cost in seconds. `+inf` if the edge is
    /// blocked or the turn is forbidden.
    pub total_cost: f64,
}

/// Evaluates time-dependent edge costs against a graph, profile store,
/// optional live overlay, and optional turn-cost map.
pub struct CostEngine<'a> {
    graph: &'a EdgeGraph,
    profiles: &'a ProfileStore,
    overlay: Option<&'a LiveOverlay>,
    turns: Option<&'a TurnCostMap>,
    temporal_context: &'a ResolvedTemporalContext,
    time_unit: EngineTimeUnit,
    bucket_size_seconds: f64,
    sampling_policy: TemporalSamplingPolicy,
}

impl<'a> CostEngine<'a> {
    /// Constructs a cost engine over the given graph/profile/overlay/turn
    /// inputs. `overlay` and `turns` are optional per spec §3 ("absence
    /// equals no contribution").
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &'a EdgeGraph,
        profiles: &'a ProfileStore,
        overlay: Option<&'a LiveOverlay>,
        turns: Option<&'a TurnCostMap>,
        temporal_context: &'a ResolvedTemporalContext,
        time_unit: EngineTimeUnit,
        bucket_size_seconds: f64,
        sampling_policy: TemporalSamplingPolicy,
    ) -> Self {
        Self {
            graph,
            profiles,
            overlay,
            turns,
            temporal_context,
            time_unit,
            bucket_size_seconds,
            sampling_policy,
        }
    }

    fn temporal_multiplier(&self, edge: EdgeId, entry_tick: Tick) -> f32 {
        let Some(profile) = self.profiles.get(self.graph.profile_id(edge)) else {
            return 1.0;
        };
        if profile.bucket_count() == 0 {
            return profile.multiplier;
        }
        let pos = self.temporal_context.resolve(
            entry_tick,
            self.time_unit,
            profile.bucket_count(),
            self.bucket_size_seconds,
        );
        if !profile.is_day_active(pos.day_of_week) {
            return crate::profile::DEFAULT_MULTIPLIER;
        }
        let curve = match self.sampling_policy {
            TemporalSamplingPolicy::Discrete => profile.buckets[pos.bucket_index],
            TemporalSamplingPolicy::Interpolated => {
                let next_index = (pos.bucket_index + 1) % profile.bucket_count();
                let a = profile.buckets[pos.bucket_index];
                let b = profile.buckets[next_index];
                let t = pos.fractional_bucket as f32;
                a + (b - a) * t
            }
        };
        curve * profile.multiplier
    }

    /// Computes the transition cost in seconds for traversing `edge`,
    /// entering at `entry_tick`, optionally preceded by `from_edge` for
    /// turn-penalty evaluation. Returns `+inf` if the edge is blocked by
    /// the live overlay or the turn is forbidden.
    #[must_use]
    pub fn compute_edge_cost(
        &self,
        edge: EdgeId,
        entry_tick: Tick,
        from_edge: Option<EdgeId>,
    ) -> f64 {
        self.explain_edge_cost(edge, entry_tick, from_edge).total_cost
    }

    /// As [`Self::compute_edge_cost`], but returns the full breakdown.
    #[must_use]
    pub fn explain_edge_cost(
        &self,
        edge: EdgeId,
        entry_tick: Tick,
        from_edge: Option<EdgeId>,
    ) -> CostBreakdown {
        let base_weight = self.graph.base_weight(edge);
        let temporal_multiplier = self.temporal_multiplier(edge, entry_tick);

        let (live_speed_factor, live_blocked) = match self.overlay.map(|o| o.lookup(edge, entry_tick)) {
            Some(LiveLookup::Active(factor)) => (factor, false),
            Some(LiveLookup::Blocked) => (0.0, true),
            Some(LiveLookup::Missing | LiveLookup::Expired) | None => (1.0, false),
        };

        let turn_penalty = match (self.turns, from_edge) {
            (Some(turns), Some(from)) => turns.penalty(from, edge),
            _ => 0.0,
        };
        let turn_forbidden = turn_penalty.is_infinite();

        let total_cost = if live_blocked || turn_forbidden {
            f64::INFINITY
        } else {
            let speed_adjusted = if live_speed_factor > 0.0 {
                f64::from(base_weight) * f64::from(temporal_multiplier) / f64::from(live_speed_factor)
            } else {
                f64::from(base_weight) * f64::from(temporal_multiplier)
            };
            speed_adjusted + f64::from(turn_penalty)
        };

        CostBreakdown {
            base_weight,
            temporal_multiplier,
            live_speed_factor,
            live_blocked,
            turn_penalty,
            total_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::ident::{NodeId, ProfileId};
    use crate::overlay::{CapacityPolicy, LiveUpdate};
    use crate::profile::Profile;

    fn single_edge_graph() -> EdgeGraph {
        EdgeGraph::new(
            vec![0, 1, 1],
            vec![NodeId(1)],
            vec![NodeId(0)],
            vec![10.0],
            vec![ProfileId(0)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn flat_profile_yields_base_weight() {
        let graph = single_edge_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![1.0; 24], 1.0)]);
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
        let cost = engine.compute_edge_cost(EdgeId(0), 0, None);
        assert!((cost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn live_overlay_blocked_edge_is_infinite() {
        let graph = single_edge_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![1.0; 24], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let overlay = LiveOverlay::new(10, CapacityPolicy::RejectBatch, false);
        overlay
            .apply_batch(
                &[LiveUpdate {
                    edge: EdgeId(0),
                    speed_factor: 0.0,
                    valid_until_ticks: 100,
                }],
                0,
            )
            .unwrap();
        let engine = CostEngine::new(
            &graph,
            &profiles,
            Some(&overlay),
            None,
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        assert_eq!(engine.compute_edge_cost(EdgeId(0), 0, None), f64::INFINITY);
    }

    #[test]
    fn slowdown_speed_factor_increases_cost() {
        let graph = single_edge_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![1.0; 24], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let overlay = LiveOverlay::new(10, CapacityPolicy::RejectBatch, false);
        overlay
            .apply_batch(
                &[LiveUpdate {
                    edge: EdgeId(0),
                    speed_factor: 0.5,
                    valid_until_ticks: 100,
                }],
                0,
            )
            .unwrap();
        let engine = CostEngine::new(
            &graph,
            &profiles,
            Some(&overlay),
            None,
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        let cost = engine.compute_edge_cost(EdgeId(0), 0, None);
        assert!((cost - 20.0).abs() < 1e-9);
    }

    #[test]
    fn forbidden_turn_is_infinite() {
        let graph = single_edge_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![1.0; 24], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let turns = TurnCostMap::new([(EdgeId(5), EdgeId(0), crate::turn::FORBIDDEN)]);
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
        let cost = engine.compute_edge_cost(EdgeId(0), 0, Some(EdgeId(5)));
        assert_eq!(cost, f64::INFINITY);
    }

    #[test]
    fn missing_overlay_entry_behaves_as_no_override() {
        let graph = single_edge_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![1.0; 24], 1.0)]);
        let ctx = ResolvedTemporalContext::Linear;
        let overlay = LiveOverlay::new(10, CapacityPolicy::RejectBatch, false);
        let engine = CostEngine::new(
            &graph,
            &profiles,
            Some(&overlay),
            None,
            &ctx,
            EngineTimeUnit::Seconds,
            3600.0,
            TemporalSamplingPolicy::Discrete,
        );
        let cost = engine.compute_edge_cost(EdgeId(0), 0, None);
        assert!((cost - 10.0).abs() < 1e-9);
    }
}
