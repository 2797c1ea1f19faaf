//! Aggregate runtime configuration (spec §6).
//!
//! `RouteCoreConfig` is a plain struct with a spec-matching [`Default`];
//! unlike the graph/profile data it wraps, it carries no invariants that
//! require a fallible constructor — every field has a sensible default
//! and every combination of fields is valid on its own (cross-field
//! validation, e.g. algorithm/heuristic compatibility, happens at the
//! point a request is actually evaluated against it).

use crate::budget::{MatrixBudget, SearchBudget, TerminationPolicy};
use crate::cost::TemporalSamplingPolicy;
use crate::overlay::CapacityPolicy;
use crate::tick::EngineTimeUnit;

/// Aggregate configuration for a [`crate::route_core::RouteCore`]
/// instance.
#[derive(Clone, Debug)]
pub struct RouteCoreConfig {
    /// Unit ticks are measured in.
    pub time_unit: EngineTimeUnit,
    /// Width of a temporal profile bucket, in seconds.
    pub bucket_size_seconds: f64,
    /// How a profile's bucket curve is sampled between bucket boundaries.
    pub sampling_policy: TemporalSamplingPolicy,
    /// Point-to-point search budget.
    pub search_budget: SearchBudget,
    /// Matrix row/request budget.
    pub matrix_budget: MatrixBudget,
    /// Matrix native-vs-pairwise dispatch threshold.
    pub termination_policy: TerminationPolicy,
    /// Maximum number of entries the live overlay may hold.
    pub max_live_overrides: usize,
    /// Live overlay capacity-exceeded behavior.
    pub overlay_capacity_policy: CapacityPolicy,
    /// Whether a read-path lookup opportunistically evicts an expired
    /// overlay entry it encounters (Open Question, resolved `false`:
    /// cleanup stays solely the scheduled sweep's job so read latency
    /// never pays a write-path cost).
    pub overlay_cleanup_on_read: bool,
}

impl Default for RouteCoreConfig {
    fn default() -> Self {
        Self {
            time_unit: EngineTimeUnit::Seconds,
            bucket_size_seconds: 3600.0,
            sampling_policy: TemporalSamplingPolicy::Discrete,
            search_budget: SearchBudget::default(),
            matrix_budget: MatrixBudget::default(),
            termination_policy: TerminationPolicy::default(),
            max_live_overrides: 1_000_000,
            overlay_capacity_policy: CapacityPolicy::EvictExpiredThenReject,
            overlay_cleanup_on_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = RouteCoreConfig::default();
        assert_eq!(config.time_unit, EngineTimeUnit::Seconds);
        assert!((config.bucket_size_seconds - 3600.0).abs() < f64::EPSILON);
        assert!(!config.overlay_cleanup_on_read);
    }
}
