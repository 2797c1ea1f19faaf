//! Incoming-edge index and precomputed static edge lower bounds (spec
//! §4.4's backward lane, §4.5).
//!
//! The backward lane of the bidirectional planner walks edges against
//! their natural direction, so it needs a CSR-style index of incoming
//! edges per node in addition to the graph's native outgoing index.

use crate::graph::EdgeGraph;
use crate::ident::{EdgeId, NodeId};
use crate::profile::ProfileStore;

/// CSR-style index of incoming edges per node, built once from an
/// [`EdgeGraph`] and reused across queries.
#[derive(Clone, Debug)]
pub struct ReverseEdgeIndex {
    first_incoming: Vec<u32>,
    incoming_edges: Vec<EdgeId>,
    /// Static per-edge lower bound on cost: `base_weight * min_multiplier`,
    /// the cheapest this edge can ever be regardless of time of entry or
    /// live conditions (spec §4.4's backward lane uses this as an
    /// admissible static cost, never the live-overlay-adjusted one).
    edge_lower_bound: Vec<f64>,
}

impl ReverseEdgeIndex {
    /// Builds the reverse index and static lower-bound array from
    /// `graph`/`profiles`.
    #[must_use]
    pub fn build(graph: &EdgeGraph, profiles: &ProfileStore) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();
        let mut incoming_degree = vec![0u32; node_count];
        for edge in 0..edge_count {
            let dst = graph.destination(EdgeId(edge as u32));
            incoming_degree[dst.index()] += 1;
        }
        let mut first_incoming = vec![0u32; node_count + 1];
        for node in 0..node_count {
            first_incoming[node + 1] = first_incoming[node] + incoming_degree[node];
        }
        let mut cursor = first_incoming.clone();
        let mut incoming_edges = vec![EdgeId(0); edge_count];
        for edge in 0..edge_count {
            let edge_id = EdgeId(edge as u32);
            let dst = graph.destination(edge_id).index();
            incoming_edges[cursor[dst] as usize] = edge_id;
            cursor[dst] += 1;
        }

        let edge_lower_bound = (0..edge_count)
            .map(|edge| {
                let edge_id = EdgeId(edge as u32);
                let min_multiplier = profiles
                    .get(graph.profile_id(edge_id))
                    .map_or(1.0, |p| f64::from(p.min_multiplier()));
                f64::from(graph.base_weight(edge_id)) * min_multiplier
            })
            .collect();

        Self {
            first_incoming,
            incoming_edges,
            edge_lower_bound,
        }
    }

    /// Iterates the incoming edge ids of `node`.
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let i = node.index();
        let range = self.first_incoming[i] as usize..self.first_incoming[i + 1] as usize;
        range.map(|j| self.incoming_edges[j])
    }

    /// Returns the precomputed static lower bound on `edge`'s cost.
    #[must_use]
    pub fn edge_lower_bound(&self, edge: EdgeId) -> f64 {
        self.edge_lower_bound[edge.index()]
    }
}
