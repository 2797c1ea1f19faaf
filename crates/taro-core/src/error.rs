//! The crate's single error taxonomy, with stable reason codes.
//!
//! Every [`TaroError`] variant carries a stable textual prefix via
//! [`TaroError::code`], grouped by the subsystem that raises it (spec §6,
//! §7). Downstream tooling is expected to match on these codes, so
//! prefixes are never renamed once shipped.

use crate::ident::{EdgeId, NodeId};

/// Unified error type for every fallible TARO core operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TaroError {
    // ---- Input validation -------------------------------------------------
    /// An external id string was empty or whitespace-only.
    #[error("external id is missing or blank")]
    BlankExternalId,
    /// An external id could not be resolved by the `IdMapper`.
    #[error("unknown external id: {0}")]
    UnknownId(String),
    /// The requested algorithm/heuristic combination is invalid (e.g.
    /// `Dijkstra` requires `HeuristicType::None`).
    #[error("algorithm {algorithm:?} is incompatible with heuristic {heuristic:?}")]
    AlgorithmHeuristicMismatch {
        /// The requested algorithm.
        algorithm: &'static str,
        /// The requested heuristic type.
        heuristic: &'static str,
    },
    /// A coordinate value was non-finite.
    #[error("non-finite coordinate encountered")]
    NonFiniteCoordinate,
    /// A latitude or longitude value was outside its valid domain.
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    CoordinateOutOfRange {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
    },
    /// A configured bucket size was non-positive.
    #[error("bucket size must be positive, got {0}")]
    NonPositiveBucketSize(f64),
    /// The raw CSR arrays handed to `EdgeGraph::new` violated a structural
    /// invariant (array length mismatch, non-monotonic `first_edge`, an
    /// out-of-bounds destination, or a non-finite/negative base weight).
    #[error("malformed graph input: {0}")]
    MalformedGraph(&'static str),

    // ---- Contract mismatch --------------------------------------------
    /// The planner was constructed against a different `EdgeGraph` or
    /// `ProfileStore` than the cost engine it was handed.
    #[error("cost engine graph/profile store does not match planner construction contract")]
    ContractMismatch,
    /// A `LandmarkStore`'s compatibility signature does not match the
    /// bound `EdgeGraph`.
    #[error("landmark store signature does not match graph contract")]
    LandmarkSignatureMismatch,
    /// Replaying a reconstructed edge path found an edge whose origin did
    /// not match the previous edge's destination.
    #[error("path reconstruction mismatch at edge {edge}: expected origin {expected}, found {found}")]
    ReconstructionMismatch {
        /// The edge whose origin did not match.
        edge: EdgeId,
        /// The node id the replay expected as origin.
        expected: NodeId,
        /// The node id actually stored as the edge's origin.
        found: NodeId,
    },
    /// The point-to-point search exhausted its frontier without ever
    /// reaching the goal.
    #[error("no route exists from {origin} to {goal}")]
    RouteUnreachable {
        /// The requested source node.
        origin: NodeId,
        /// The requested goal node.
        goal: NodeId,
    },

    // ---- Budget exceeded -------------------------------------------------
    /// The route planner's settled-state budget was exceeded.
    #[error("settled-state budget exceeded: {0}")]
    SettledBudgetExceeded(u64),
    /// The route planner's label budget was exceeded.
    #[error("label budget exceeded: {0}")]
    LabelBudgetExceeded(u64),
    /// The route planner's frontier-size budget was exceeded.
    #[error("frontier-size budget exceeded: {0}")]
    FrontierBudgetExceeded(u64),
    /// A matrix row's work budget was exceeded.
    #[error("matrix row work budget exceeded: {0}")]
    RowWorkBudgetExceeded(u64),
    /// A matrix row's label budget was exceeded.
    #[error("matrix row label budget exceeded: {0}")]
    RowLabelBudgetExceeded(u64),
    /// A matrix row's frontier budget was exceeded.
    #[error("matrix row frontier budget exceeded: {0}")]
    RowFrontierBudgetExceeded(u64),
    /// A matrix request's total work budget was exceeded.
    #[error("matrix request work budget exceeded: {0}")]
    RequestWorkBudgetExceeded(u64),

    // ---- Numeric safety ----------------------------------------------------
    /// A frontier priority was non-finite or negative.
    #[error("non-finite or negative frontier priority: {0}")]
    InvalidFrontierPriority(f64),
    /// An edge cost or cumulative path cost during replay was non-finite
    /// where a finite value was required.
    #[error("non-finite cost encountered during path replay")]
    NonFiniteReplayCost,

    // ---- Live overlay -------------------------------------------------
    /// A live overlay batch exceeded `max_live_overrides` under the
    /// configured capacity policy.
    #[error("live overlay capacity exceeded: {accepted} accepted, {rejected} rejected")]
    OverlayCapacityExceeded {
        /// Number of updates accepted before capacity was hit.
        accepted: usize,
        /// Number of updates rejected for capacity reasons.
        rejected: usize,
    },
    /// A `LiveUpdate` speed factor was outside `[0, 1]` or non-finite.
    #[error("invalid live overlay speed factor: {0}")]
    InvalidSpeedFactor(f32),
    /// Computing `valid_until_ticks` from `now + ttl` overflowed.
    #[error("live overlay TTL addition overflowed")]
    OverlayTtlOverflow,

    // ---- Heuristic configuration ---------------------------------------
    /// The requested heuristic type requires configuration that was not
    /// supplied (e.g. landmark store).
    #[error("required heuristic type is missing its configuration")]
    HeuristicTypeMissing,
    /// The requested heuristic requires node coordinates, which the graph
    /// does not carry.
    #[error("heuristic requires node coordinates, but the graph has none")]
    HeuristicCoordinatesRequired,
    /// Calibrating a distance-scaled heuristic failed (empty graph, no
    /// positive-distance edges, or non-finite inputs).
    #[error("heuristic calibration produced no finite non-negative scale")]
    HeuristicCalibrationFailed,
}

impl TaroError {
    /// Returns the stable reason-code prefix for this error, grouped by
    /// subsystem (spec §6). Downstream ops tooling asserts on these codes;
    /// they must never change once shipped.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankExternalId => "route-core.validation.blank-id",
            Self::UnknownId(_) => "route-core.validation.unknown-id",
            Self::AlgorithmHeuristicMismatch { .. } => "route-core.validation.algorithm-heuristic-mismatch",
            Self::NonFiniteCoordinate => "route-core.validation.non-finite-coordinate",
            Self::CoordinateOutOfRange { .. } => "route-core.validation.coordinate-out-of-range",
            Self::NonPositiveBucketSize(_) => "route-core.validation.non-positive-bucket-size",
            Self::MalformedGraph(_) => "route-core.validation.malformed-graph",
            Self::ContractMismatch => "route-core.contract.store-mismatch",
            Self::LandmarkSignatureMismatch => "route-core.contract.landmark-signature-mismatch",
            Self::ReconstructionMismatch { .. } => "route-core.reconstruction.origin-mismatch",
            Self::RouteUnreachable { .. } => "route-core.reconstruction.unreachable",
            Self::SettledBudgetExceeded(_) => "route-core.budget.settled",
            Self::LabelBudgetExceeded(_) => "route-core.budget.labels",
            Self::FrontierBudgetExceeded(_) => "route-core.budget.frontier",
            Self::RowWorkBudgetExceeded(_) => "route-core.budget.row-work",
            Self::RowLabelBudgetExceeded(_) => "route-core.budget.row-labels",
            Self::RowFrontierBudgetExceeded(_) => "route-core.budget.row-frontier",
            Self::RequestWorkBudgetExceeded(_) => "route-core.budget.request-work",
            Self::InvalidFrontierPriority(_) => "route-core.numeric.frontier-priority",
            Self::NonFiniteReplayCost => "route-core.numeric.replay-cost",
            Self::OverlayCapacityExceeded { .. } => "route-core.overlay.capacity-exceeded",
            Self::InvalidSpeedFactor(_) => "route-core.overlay.invalid-speed-factor",
            Self::OverlayTtlOverflow => "route-core.overlay.ttl-overflow",
            Self::HeuristicTypeMissing => "route-core.heuristic.type-missing",
            Self::HeuristicCoordinatesRequired => "route-core.heuristic.coordinates-required",
            Self::HeuristicCalibrationFailed => "route-core.heuristic.calibration-failed",
        }
    }
}

/// Convenience alias for fallible TARO core operations.
pub type TaroResult<T> = Result<T, TaroError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(TaroError::BlankExternalId.code(), "route-core.validation.blank-id");
        assert_eq!(
            TaroError::SettledBudgetExceeded(5).code(),
            "route-core.budget.settled"
        );
    }
}
