//! Immutable temporal profiles (spec §3, §4.2's temporal multiplier).

use crate::error::{TaroError, TaroResult};
use crate::ident::ProfileId;

/// Default multiplier applied on an inactive day-mask bit, or when a
/// `Calendar` context's weekday is not selected by the profile (spec
/// §4.2 step 2).
pub const DEFAULT_MULTIPLIER: f32 = 1.0;

/// A single temporal profile: a day-mask of active weekdays, a bucketized
/// multiplier curve across the day, and a scalar multiplier.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 7-bit day mask, Monday = bit 0.
    pub day_mask: u8,
    /// Per-bucket multipliers across the day.
    pub buckets: Vec<f32>,
    /// Scalar multiplier applied on top of the bucket value.
    pub multiplier: f32,
    min_multiplier: f32,
}

impl Profile {
    /// Constructs a profile, precomputing `min_multiplier` per spec §3:
    /// `min(buckets) * multiplier`, clamped to `[0, 1]`. Used as an
    /// admissible lower bound elsewhere (heuristic calibration, the
    /// planner's static edge lower bound); an empty bucket array floors
    /// to `0` rather than skewing the bound upward.
    #[must_use]
    pub fn new(day_mask: u8, buckets: Vec<f32>, multiplier: f32) -> Self {
        let raw_min = buckets
            .iter()
            .copied()
            .filter(|b| b.is_finite())
            .fold(f32::INFINITY, f32::min);
        let scaled = if raw_min.is_finite() {
            raw_min * multiplier
        } else {
            0.0
        };
        let min_multiplier = scaled.clamp(0.0, 1.0);
        Self {
            day_mask,
            buckets,
            multiplier,
            min_multiplier,
        }
    }

    /// Number of buckets in this profile's daily curve.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if `weekday` (`0` = Monday) is active in this
    /// profile's day-mask.
    #[must_use]
    pub fn is_day_active(&self, weekday: u8) -> bool {
        debug_assert!(weekday < 7);
        (self.day_mask & (1 << weekday)) != 0
    }

    /// The cached minimum multiplier this profile can ever produce,
    /// clamped to `[0, 1]`, used as a lower bound by admissible
    /// heuristics and the planner's static edge lower bound.
    #[must_use]
    pub fn min_multiplier(&self) -> f32 {
        self.min_multiplier
    }
}

/// Immutable collection of [`Profile`]s, indexed by [`ProfileId`].
#[derive(Clone, Debug, Default)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
}

impl ProfileStore {
    /// Builds a store from a list of profiles; index `i` becomes
    /// `ProfileId(i)`.
    #[must_use]
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    /// Number of profiles in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if the store has no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Looks up a profile by id.
    #[must_use]
    pub fn get(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.get(id.index())
    }

    /// Validates that `bucket_size_seconds` is positive, per spec §7.
    pub fn validate_bucket_size(bucket_size_seconds: f64) -> TaroResult<()> {
        if bucket_size_seconds > 0.0 && bucket_size_seconds.is_finite() {
            Ok(())
        } else {
            Err(TaroError::NonPositiveBucketSize(bucket_size_seconds))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn min_multiplier_is_clamped_and_cached() {
        let p = Profile::new(0b0111_1111, vec![0.5, 1.0, 2.0], 1.0);
        assert!((p.min_multiplier() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn min_multiplier_clamps_above_one() {
        let p = Profile::new(0b0111_1111, vec![2.0, 3.0], 1.5);
        assert!((p.min_multiplier() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn day_mask_monday_is_bit_zero() {
        let p = Profile::new(0b0000_0001, vec![1.0], 1.0);
        assert!(p.is_day_active(0));
        assert!(!p.is_day_active(1));
    }

    #[test]
    fn bucket_size_validation_rejects_non_positive() {
        assert!(ProfileStore::validate_bucket_size(0.0).is_err());
        assert!(ProfileStore::validate_bucket_size(-1.0).is_err());
        assert!(ProfileStore::validate_bucket_size(60.0).is_ok());
    }
}
