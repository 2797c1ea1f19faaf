//! Resolved temporal context: maps an entry tick to `(weekday, bucket,
//! fractional_bucket)` (spec §3, §4.2 step 2).

use crate::tick::{EngineTimeUnit, Tick};

/// A derived `(day_of_week, bucket_index, fractional_bucket)` triple.
///
/// `day_of_week` is `0` for Monday through `6` for Sunday.
/// `fractional_bucket` is in `[0, 1)`, the position within `bucket_index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketPosition {
    /// Weekday, `0` = Monday.
    pub day_of_week: u8,
    /// Index into a profile's bucket array.
    pub bucket_index: usize,
    /// Fractional position within the bucket, in `[0, 1)`.
    pub fractional_bucket: f64,
}

/// How an entry tick maps to wall-clock time for day/bucket derivation.
///
/// The `Linear` variant ignores weekday entirely and bucketizes modulo the
/// bucket count, appropriate for synthetic/offset time bases that do not
/// correspond to a real calendar. The `Calendar*` variants resolve an
/// actual weekday, which the day-mask then gates.
#[derive(Clone, Debug)]
pub enum ResolvedTemporalContext {
    /// Ticks are a plain offset; no calendar semantics, no weekday gating.
    Linear,
    /// Ticks are seconds/milliseconds since the Unix epoch, UTC.
    CalendarUtc,
    /// Ticks are since the Unix epoch; `offset_seconds` is a fixed UTC
    /// offset applied before weekday/second-of-day derivation (a
    /// resolved, already-looked-up zone offset — DST table lookups are
    /// performed by the caller outside this crate, per spec §6).
    CalendarWithZone {
        /// Opaque zone identifier, carried for diagnostics only.
        zone_id: String,
        /// Fixed UTC offset in seconds, already resolved for the query's
        /// effective instant.
        offset_seconds: i64,
    },
}

const SECONDS_PER_DAY: i64 = 86_400;

impl ResolvedTemporalContext {
    /// Derives `(day_of_week, bucket_index, fractional_bucket)` for
    /// `entry_ticks`, using `bucket_count` buckets of `bucket_size_seconds`
    /// width each, per spec §4.2 step 2.
    #[must_use]
    pub fn resolve(
        &self,
        entry_ticks: Tick,
        unit: EngineTimeUnit,
        bucket_count: usize,
        bucket_size_seconds: f64,
    ) -> BucketPosition {
        let seconds = to_seconds(entry_ticks, unit);
        match self {
            Self::Linear => {
                let bucket_count = bucket_count.max(1);
                let day_seconds = bucket_count as f64 * bucket_size_seconds;
                let wrapped = rem_euclid_f64(seconds, day_seconds.max(f64::MIN_POSITIVE));
                let (bucket_index, fractional_bucket) =
                    bucket_from_offset(wrapped, bucket_size_seconds, bucket_count);
                BucketPosition {
                    day_of_week: 0,
                    bucket_index,
                    fractional_bucket,
                }
            }
            Self::CalendarUtc => resolve_calendar(seconds, 0, bucket_count, bucket_size_seconds),
            Self::CalendarWithZone { offset_seconds, .. } => {
                resolve_calendar(seconds, *offset_seconds, bucket_count, bucket_size_seconds)
            }
        }
    }
}

fn to_seconds(ticks: Tick, unit: EngineTimeUnit) -> f64 {
    match unit {
        EngineTimeUnit::Seconds => ticks as f64,
        EngineTimeUnit::Milliseconds => ticks as f64 / 1000.0,
    }
}

fn rem_euclid_f64(value: f64, modulus: f64) -> f64 {
    let r = value % modulus;
    if r < 0.0 {
        r + modulus
    } else {
        r
    }
}

fn bucket_from_offset(
    offset_seconds: f64,
    bucket_size_seconds: f64,
    bucket_count: usize,
) -> (usize, f64) {
    let bucket_size = bucket_size_seconds.max(f64::MIN_POSITIVE);
    let raw_bucket = (offset_seconds / bucket_size).floor();
    let fractional = (offset_seconds / bucket_size) - raw_bucket;
    let bucket_index = (raw_bucket as i64).rem_euclid(bucket_count.max(1) as i64) as usize;
    (bucket_index, fractional.clamp(0.0, f64::from(f32::MAX)).min(0.999_999_999))
}

fn resolve_calendar(
    unix_seconds: f64,
    offset_seconds: i64,
    bucket_count: usize,
    bucket_size_seconds: f64,
) -> BucketPosition {
    let local_seconds = unix_seconds + offset_seconds as f64;
    let days_since_epoch = (local_seconds / SECONDS_PER_DAY as f64).floor();
    let second_of_day = rem_euclid_f64(local_seconds, SECONDS_PER_DAY as f64);
    // 1970-01-01 was a Thursday: weekday index 3 (Monday = 0).
    let day_index = (days_since_epoch as i64).rem_euclid(7);
    let day_of_week = ((day_index + 3).rem_euclid(7)) as u8;
    let (bucket_index, fractional_bucket) =
        bucket_from_offset(second_of_day, bucket_size_seconds, bucket_count);
    BucketPosition {
        day_of_week,
        bucket_index,
        fractional_bucket,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn linear_ignores_weekday_and_wraps() {
        let ctx = ResolvedTemporalContext::Linear;
        let pos = ctx.resolve(3600, EngineTimeUnit::Seconds, 24, 3600.0);
        assert_eq!(pos.day_of_week, 0);
        assert_eq!(pos.bucket_index, 1);
    }

    #[test]
    fn calendar_utc_epoch_is_thursday() {
        let ctx = ResolvedTemporalContext::CalendarUtc;
        let pos = ctx.resolve(0, EngineTimeUnit::Seconds, 24, 3600.0);
        // Thursday = index 3 (Monday = 0).
        assert_eq!(pos.day_of_week, 3);
        assert_eq!(pos.bucket_index, 0);
    }

    #[test]
    fn calendar_monday_midnight_utc() {
        // 1970-01-05 00:00:00 UTC was a Monday.
        let ctx = ResolvedTemporalContext::CalendarUtc;
        let four_days = 4 * SECONDS_PER_DAY;
        let pos = ctx.resolve(four_days, EngineTimeUnit::Seconds, 24, 3600.0);
        assert_eq!(pos.day_of_week, 0);
    }

    #[test]
    fn milliseconds_unit_is_converted() {
        let ctx = ResolvedTemporalContext::Linear;
        let pos = ctx.resolve(3_600_000, EngineTimeUnit::Milliseconds, 24, 3600.0);
        assert_eq!(pos.bucket_index, 1);
    }

    #[test]
    fn fractional_bucket_is_in_unit_range() {
        let ctx = ResolvedTemporalContext::Linear;
        let pos = ctx.resolve(1800, EngineTimeUnit::Seconds, 24, 3600.0);
        assert!(pos.fractional_bucket >= 0.0 && pos.fractional_bucket < 1.0);
        assert!((pos.fractional_bucket - 0.5).abs() < 1e-6);
    }
}
