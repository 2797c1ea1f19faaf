//! Admissible goal-bound heuristics for the time-dependent A* planner
//! (spec §4.4, §6).

use crate::error::{TaroError, TaroResult};
use crate::graph::EdgeGraph;
use crate::ident::NodeId;
use crate::profile::ProfileStore;

/// A source of admissible lower-bound distance/cost estimates from a node
/// to a fixed goal.
///
/// Implementations must never overestimate the true remaining cost;
/// violating this breaks A*'s optimality guarantee (spec §4.4).
pub trait HeuristicProvider {
    /// Returns a lower bound, in seconds, on the remaining cost from
    /// `from` to the heuristic's bound goal.
    fn estimate(&self, from: NodeId) -> f64;
}

/// Precomputed landmark distances used by [`HeuristicType::Landmark`].
///
/// A `LandmarkStore` is built once per graph and reused across queries;
/// [`LandmarkStore::compatibility_signature`] lets [`GoalBoundHeuristic`]
/// detect a store built against a different graph before using it (spec
/// §7, `LandmarkSignatureMismatch`).
pub trait LandmarkStore {
    /// Opaque signature identifying which `EdgeGraph` this store was
    /// built from. Two stores with equal signatures are interchangeable.
    fn compatibility_signature(&self) -> u64;
    /// Lower-bound distance, in seconds, from `node` to landmark `index`.
    fn distance_to_landmark(&self, node: NodeId, index: usize) -> f64;
    /// Lower-bound distance, in seconds, from landmark `index` to `node`.
    fn distance_from_landmark(&self, node: NodeId, index: usize) -> f64;
    /// Number of landmarks in this store.
    fn landmark_count(&self) -> usize;
}

/// Which admissible heuristic a query should use (spec §6).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeuristicType {
    /// No heuristic; degenerates the A* search to plain Dijkstra.
    None,
    /// Planar Euclidean distance scaled by a calibrated minimum speed.
    Euclidean,
    /// Great-circle (haversine) distance scaled by a calibrated minimum
    /// speed.
    Spherical,
    /// Landmark/ALT-style triangle-inequality lower bound.
    Landmark,
}

/// A goal-bound admissible heuristic, resolved against a fixed goal node
/// for the duration of one query.
pub enum GoalBoundHeuristic<'a> {
    /// Always returns zero; used for [`HeuristicType::None`].
    None,
    /// Planar-distance-scaled heuristic.
    Euclidean {
        /// The graph the heuristic reads node coordinates from.
        graph: &'a EdgeGraph,
        /// The fixed goal node this heuristic estimates distance to.
        goal: NodeId,
        /// Calibrated fastest seconds-per-meter rate used to scale distance.
        min_seconds_per_meter: f64,
    },
    /// Great-circle-distance-scaled heuristic.
    Spherical {
        /// The graph the heuristic reads node coordinates from.
        graph: &'a EdgeGraph,
        /// The fixed goal node this heuristic estimates distance to.
        goal: NodeId,
        /// Calibrated fastest seconds-per-meter rate used to scale distance.
        min_seconds_per_meter: f64,
    },
    /// Landmark/ALT heuristic.
    Landmark {
        /// The landmark store providing triangle-inequality lower bounds.
        store: &'a dyn LandmarkStore,
        /// The fixed goal node this heuristic estimates distance to.
        goal: NodeId,
    },
}

impl<'a> GoalBoundHeuristic<'a> {
    /// Calibrates `min_seconds_per_meter` from the graph's edges: the
    /// smallest `base_weight / great_circle_distance` ratio over edges
    /// with positive, finite distance. This is the fastest the graph
    /// ever moves per meter, making the scaled straight-line distance an
    /// admissible lower bound on travel time (spec §4.4).
    ///
    /// Returns [`TaroError::HeuristicCalibrationFailed`] if no edge
    /// yields a finite non-negative ratio (e.g. every edge has zero
    /// length).
    fn calibrate_min_seconds_per_meter(
        graph: &EdgeGraph,
        profiles: &ProfileStore,
    ) -> TaroResult<f64> {
        let mut min_ratio = f64::INFINITY;
        for edge in 0..graph.edge_count() {
            let edge_id = crate::ident::EdgeId(edge as u32);
            let origin = graph.origin(edge_id);
            let destination = graph.destination(edge_id);
            let Some(distance) = graph.great_circle_distance(origin, destination) else {
                continue;
            };
            if distance <= 0.0 || !distance.is_finite() {
                continue;
            }
            let min_multiplier = profiles
                .get(graph.profile_id(edge_id))
                .map_or(1.0, |p| f64::from(p.min_multiplier()));
            let min_weight = f64::from(graph.base_weight(edge_id)) * min_multiplier;
            let ratio = min_weight / distance;
            if ratio.is_finite() && ratio >= 0.0 && ratio < min_ratio {
                min_ratio = ratio;
            }
        }
        if min_ratio.is_finite() {
            Ok(min_ratio)
        } else {
            Err(TaroError::HeuristicCalibrationFailed)
        }
    }

    /// Resolves a [`HeuristicType`] into a usable heuristic bound to
    /// `goal`, calibrating scale factors from `graph`/`profiles` as
    /// needed.
    pub fn resolve(
        heuristic_type: HeuristicType,
        graph: &'a EdgeGraph,
        profiles: &'a ProfileStore,
        goal: NodeId,
        landmarks: Option<&'a dyn LandmarkStore>,
    ) -> TaroResult<Self> {
        match heuristic_type {
            HeuristicType::None => Ok(Self::None),
            HeuristicType::Euclidean => {
                if !graph.has_coords() {
                    return Err(TaroError::HeuristicCoordinatesRequired);
                }
                let min_seconds_per_meter = Self::calibrate_min_seconds_per_meter(graph, profiles)?;
                Ok(Self::Euclidean {
                    graph,
                    goal,
                    min_seconds_per_meter,
                })
            }
            HeuristicType::Spherical => {
                if !graph.has_coords() {
                    return Err(TaroError::HeuristicCoordinatesRequired);
                }
                let min_seconds_per_meter = Self::calibrate_min_seconds_per_meter(graph, profiles)?;
                Ok(Self::Spherical {
                    graph,
                    goal,
                    min_seconds_per_meter,
                })
            }
            HeuristicType::Landmark => {
                let store = landmarks.ok_or(TaroError::HeuristicTypeMissing)?;
                if store.compatibility_signature() != graph.contract_signature() {
                    return Err(TaroError::LandmarkSignatureMismatch);
                }
                Ok(Self::Landmark { store, goal })
            }
        }
    }
}

impl HeuristicProvider for GoalBoundHeuristic<'_> {
    fn estimate(&self, from: NodeId) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Euclidean {
                graph,
                goal,
                min_seconds_per_meter,
            } => graph
                .planar_distance(from, *goal)
                .map_or(0.0, |d| d * min_seconds_per_meter),
            Self::Spherical {
                graph,
                goal,
                min_seconds_per_meter,
            } => graph
                .great_circle_distance(from, *goal)
                .map_or(0.0, |d| d * min_seconds_per_meter),
            Self::Landmark { store, goal } => {
                // Triangle-inequality ALT bound: max over landmarks of
                // |d(L, goal) - d(L, from)| using the directed distance
                // arrays, taking the larger of the two valid directions.
                let mut best = 0.0_f64;
                for i in 0..store.landmark_count() {
                    let forward = store.distance_from_landmark(*goal, i) - store.distance_from_landmark(from, i);
                    let backward = store.distance_to_landmark(from, i) - store.distance_to_landmark(*goal, i);
                    best = best.max(forward).max(backward);
                }
                best.max(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::graph::Coord;
    use crate::ident::ProfileId;
    use crate::profile::Profile;

    fn line_graph() -> EdgeGraph {
        EdgeGraph::new(
            vec![0, 1, 1],
            vec![NodeId(1)],
            vec![NodeId(0)],
            vec![100.0],
            vec![ProfileId(0)],
            Some(vec![
                Coord { lat: 0.0, lon: 0.0 },
                Coord { lat: 0.0, lon: 0.001 },
            ]),
        )
        .unwrap()
    }

    #[test]
    fn none_heuristic_is_always_zero() {
        let h = GoalBoundHeuristic::None;
        assert_eq!(h.estimate(NodeId(0)), 0.0);
    }

    #[test]
    fn euclidean_requires_coordinates() {
        let graph = EdgeGraph::new(
            vec![0, 1, 1],
            vec![NodeId(1)],
            vec![NodeId(0)],
            vec![1.0],
            vec![ProfileId(0)],
            None,
        )
        .unwrap();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let result = GoalBoundHeuristic::resolve(
            HeuristicType::Euclidean,
            &graph,
            &profiles,
            NodeId(1),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn spherical_heuristic_is_admissible_lower_bound() {
        let graph = line_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let h = GoalBoundHeuristic::resolve(
            HeuristicType::Spherical,
            &graph,
            &profiles,
            NodeId(1),
            None,
        )
        .unwrap();
        let estimate = h.estimate(NodeId(0));
        assert!(estimate <= 100.0 + 1e-6, "heuristic overestimated: {estimate}");
        assert!(estimate >= 0.0);
    }

    #[test]
    fn landmark_requires_a_store() {
        let graph = line_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let result = GoalBoundHeuristic::resolve(
            HeuristicType::Landmark,
            &graph,
            &profiles,
            NodeId(1),
            None,
        );
        assert!(result.is_err());
    }

    struct MockLandmarkStore {
        signature: u64,
    }

    impl LandmarkStore for MockLandmarkStore {
        fn compatibility_signature(&self) -> u64 {
            self.signature
        }
        fn distance_to_landmark(&self, _node: NodeId, _index: usize) -> f64 {
            0.0
        }
        fn distance_from_landmark(&self, _node: NodeId, _index: usize) -> f64 {
            0.0
        }
        fn landmark_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn landmark_rejects_store_with_mismatched_signature() {
        let graph = line_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let store = MockLandmarkStore {
            signature: graph.contract_signature().wrapping_add(1),
        };
        let result = GoalBoundHeuristic::resolve(
            HeuristicType::Landmark,
            &graph,
            &profiles,
            NodeId(1),
            Some(&store),
        );
        assert!(matches!(result, Err(TaroError::LandmarkSignatureMismatch)));
    }

    #[test]
    fn landmark_accepts_store_with_matching_signature() {
        let graph = line_graph();
        let profiles = ProfileStore::new(vec![Profile::new(0b0111_1111, vec![], 1.0)]);
        let store = MockLandmarkStore {
            signature: graph.contract_signature(),
        };
        let result = GoalBoundHeuristic::resolve(
            HeuristicType::Landmark,
            &graph,
            &profiles,
            NodeId(1),
            Some(&store),
        );
        assert!(result.is_ok());
    }
}
