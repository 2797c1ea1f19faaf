//! Immutable CSR-style directed graph (spec §3, §4's `EdgeGraph`).
//!
//! `EdgeGraph` is produced by a loader outside this crate (model
//! deserialization from the binary on-disk format is an external
//! collaborator, spec §6) and is shared read-only across every thread for
//! the lifetime of a [`crate::route_core::RouteCore`].

use crate::error::{TaroError, TaroResult};
use crate::ident::{EdgeId, NodeId, ProfileId};

/// A node coordinate, degrees latitude/longitude.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Latitude in degrees, expected in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, expected in `[-180, 180]`.
    pub lon: f64,
}

/// Immutable CSR-style directed graph.
///
/// `first_edge` has `node_count + 1` entries; the outgoing edges of node
/// `n` are `edge_destination[first_edge[n]..first_edge[n + 1]]` (and the
/// parallel `edge_origin`/`base_weight`/`edge_profile_id` arrays).
#[derive(Clone, Debug)]
pub struct EdgeGraph {
    first_edge: Vec<u32>,
    edge_destination: Vec<NodeId>,
    edge_origin: Vec<NodeId>,
    base_weight: Vec<f32>,
    edge_profile_id: Vec<ProfileId>,
    coord: Option<Vec<Coord>>,
}

impl EdgeGraph {
    /// Builds a graph from its raw CSR arrays, validating the invariants
    /// in spec §3: `first_edge` is monotonically non-decreasing and ends
    /// at `edge_count`, every destination is in bounds, and every base
    /// weight is finite and non-negative.
    pub fn new(
        first_edge: Vec<u32>,
        edge_destination: Vec<NodeId>,
        edge_origin: Vec<NodeId>,
        base_weight: Vec<f32>,
        edge_profile_id: Vec<ProfileId>,
        coord: Option<Vec<Coord>>,
    ) -> TaroResult<Self> {
        let node_count = first_edge.len().saturating_sub(1);
        let edge_count = edge_destination.len();
        if edge_origin.len() != edge_count
            || base_weight.len() != edge_count
            || edge_profile_id.len() != edge_count
        {
            return Err(TaroError::MalformedGraph("parallel edge array length mismatch"));
        }
        if first_edge.is_empty() || first_edge[node_count] as usize != edge_count {
            return Err(TaroError::MalformedGraph("first_edge does not terminate at edge_count"));
        }
        if first_edge.windows(2).any(|w| w[0] > w[1]) {
            return Err(TaroError::MalformedGraph("first_edge is not monotonically non-decreasing"));
        }
        for &dst in &edge_destination {
            if dst.index() >= node_count {
                return Err(TaroError::MalformedGraph("edge destination out of bounds"));
            }
        }
        for &w in &base_weight {
            if !w.is_finite() || w < 0.0 {
                return Err(TaroError::MalformedGraph("base weight must be finite and non-negative"));
            }
        }
        if let Some(coords) = &coord {
            if coords.len() != node_count {
                return Err(TaroError::MalformedGraph("coord array length mismatch"));
            }
            for c in coords {
                if !c.lat.is_finite() || !c.lon.is_finite() {
                    return Err(TaroError::NonFiniteCoordinate);
                }
                if !(-90.0..=90.0).contains(&c.lat) || !(-180.0..=180.0).contains(&c.lon) {
                    return Err(TaroError::CoordinateOutOfRange {
                        lat: c.lat,
                        lon: c.lon,
                    });
                }
            }
        }
        Ok(Self {
            first_edge,
            edge_destination,
            edge_origin,
            base_weight,
            edge_profile_id,
            coord,
        })
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.first_edge.len().saturating_sub(1)
    }

    /// Number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_destination.len()
    }

    /// Returns the range of edge ids outgoing from `node`.
    #[must_use]
    pub fn out_edge_range(&self, node: NodeId) -> std::ops::Range<usize> {
        let i = node.index();
        self.first_edge[i] as usize..self.first_edge[i + 1] as usize
    }

    /// Iterates the outgoing edge ids of `node` in ascending edge-id order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edge_range(node).map(|i| EdgeId(i as u32))
    }

    /// Returns the destination node of `edge`.
    #[must_use]
    pub fn destination(&self, edge: EdgeId) -> NodeId {
        self.edge_destination[edge.index()]
    }

    /// Returns the origin node of `edge`.
    #[must_use]
    pub fn origin(&self, edge: EdgeId) -> NodeId {
        self.edge_origin[edge.index()]
    }

    /// Returns the base (untimed, unaugmented) weight of `edge`.
    #[must_use]
    pub fn base_weight(&self, edge: EdgeId) -> f32 {
        self.base_weight[edge.index()]
    }

    /// Returns the temporal profile id bound to `edge`.
    #[must_use]
    pub fn profile_id(&self, edge: EdgeId) -> ProfileId {
        self.edge_profile_id[edge.index()]
    }

    /// Returns the node coordinate, if the graph carries coordinates.
    #[must_use]
    pub fn coord(&self, node: NodeId) -> Option<Coord> {
        self.coord.as_ref().map(|c| c[node.index()])
    }

    /// Returns `true` if the graph carries node coordinates.
    #[must_use]
    pub fn has_coords(&self) -> bool {
        self.coord.is_some()
    }

    /// Euclidean planar distance between two nodes' coordinates, treating
    /// `lon`/`lat` as flat x/y. Returns `None` if coordinates are absent.
    #[must_use]
    pub fn planar_distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let ca = self.coord(a)?;
        let cb = self.coord(b)?;
        let dx = ca.lon - cb.lon;
        let dy = ca.lat - cb.lat;
        Some(dx.hypot(dy))
    }

    /// Great-circle distance in meters between two nodes' coordinates
    /// using the haversine formula, anti-meridian-safe. Returns `None` if
    /// coordinates are absent.
    #[must_use]
    pub fn great_circle_distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let ca = self.coord(a)?;
        let cb = self.coord(b)?;
        Some(haversine_meters(ca, cb))
    }

    /// Opaque signature over this graph's CSR shape, used to validate a
    /// precomputed auxiliary structure (e.g. a
    /// [`crate::heuristic::LandmarkStore`]) was built against this same
    /// graph rather than a stale or mismatched one (spec §7).
    #[must_use]
    pub fn contract_signature(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = rustc_hash::FxHasher::default();
        self.node_count().hash(&mut hasher);
        self.edge_count().hash(&mut hasher);
        self.first_edge.hash(&mut hasher);
        for dst in &self.edge_destination {
            dst.index().hash(&mut hasher);
        }
        for origin in &self.edge_origin {
            origin.index().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Mean Earth radius in meters, used by [`haversine_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters between two coordinates.
///
/// Longitude deltas are normalized into `[-180, 180]` first so that
/// antimeridian-crossing pairs (e.g. 179.9 and -179.9) are not treated as
/// nearly half the globe apart.
#[must_use]
pub fn haversine_meters(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let mut dlon = b.lon - a.lon;
    while dlon > 180.0 {
        dlon -= 360.0;
    }
    while dlon < -180.0 {
        dlon += 360.0;
    }
    let dlat = lat2 - lat1;
    let dlon_rad = dlon.to_radians();
    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon_rad / 2.0).sin();
    let h = sin_dlat.mul_add(sin_dlat, lat1.cos() * lat2.cos() * sin_dlon * sin_dlon);
    let h_clamped = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * h_clamped.sqrt().asin()
}
