//! Bounded live-traffic overlay (spec §4.1, §9).
//!
//! Readers look up an edge's live speed factor through a concurrent hash
//! map ([`dashmap::DashMap`]) without taking a global lock; a single
//! writer mutex-serializes batch applies and scheduled sweeps so
//! concurrent maintenance calls do not race each other.

use std::sync::Mutex;

use dashmap::DashMap;

use crate::error::{TaroError, TaroResult};
use crate::ident::EdgeId;
use crate::tick::Tick;

/// A single live-traffic override to apply to an edge.
#[derive(Clone, Copy, Debug)]
pub struct LiveUpdate {
    /// The edge being overridden.
    pub edge: EdgeId,
    /// Multiplicative speed factor in `[0, 1]`; `0` blocks the edge
    /// outright.
    pub speed_factor: f32,
    /// Tick at which this override stops applying.
    pub valid_until_ticks: Tick,
}

impl LiveUpdate {
    fn validate(self) -> TaroResult<Self> {
        if !self.speed_factor.is_finite() || !(0.0..=1.0).contains(&self.speed_factor) {
            return Err(TaroError::InvalidSpeedFactor(self.speed_factor));
        }
        Ok(self)
    }
}

#[derive(Clone, Copy, Debug)]
struct LiveOverlayEntry {
    speed_factor: f32,
    valid_until_ticks: Tick,
}

/// Result of looking up an edge's live state at a given tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LiveLookup {
    /// No override is present for this edge.
    Missing,
    /// An override exists but `valid_until_ticks` has passed `now`.
    Expired,
    /// The edge is blocked (`speed_factor == 0`).
    Blocked,
    /// The edge carries the given live speed factor.
    Active(f32),
}

/// Outcome of an [`LiveOverlay::apply_batch`] call (spec §4.1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchApplyResult {
    /// Updates inserted into the overlay.
    pub accepted: usize,
    /// Updates dropped because capacity was exceeded even after any
    /// eviction the configured [`CapacityPolicy`] performs.
    pub rejected_capacity: usize,
    /// Updates dropped because they were already expired on arrival
    /// (`valid_until_ticks <= now`).
    pub rejected_expired: usize,
    /// Pre-existing entries evicted because they had expired.
    pub evicted_expired: usize,
    /// Pre-existing entries evicted by soonest-expiry to make room.
    pub evicted_oldest: usize,
}

/// How [`LiveOverlay::apply_batch`] behaves when `max_live_overrides`
/// would be exceeded (spec §4.1).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CapacityPolicy {
    /// Reject the whole incoming batch, leaving existing entries intact.
    RejectBatch,
    /// Evict already-expired entries first, then reject the batch if
    /// still over capacity.
    EvictExpiredThenReject,
    /// Evict the entries with the oldest `valid_until_ticks` to make
    /// room, without regard to whether they've already expired.
    EvictOldestExpiry,
}

/// A concurrently-readable, singly-written bounded overlay of live edge
/// speed factors.
pub struct LiveOverlay {
    entries: DashMap<EdgeId, LiveOverlayEntry>,
    capacity: usize,
    capacity_policy: CapacityPolicy,
    cleanup_on_read: bool,
    write_lock: Mutex<()>,
}

impl LiveOverlay {
    /// Creates an empty overlay bounded to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize, capacity_policy: CapacityPolicy, cleanup_on_read: bool) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
            capacity_policy,
            cleanup_on_read,
            write_lock: Mutex::new(()),
        }
    }

    /// Number of entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the overlay holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the live state of `edge` at `now`, per spec §4.1's
    /// lookup result taxonomy. An entry is expired when `now >=
    /// valid_until_ticks` (the bound is exclusive). When `cleanup_on_read`
    /// is enabled, an expired entry found here is also removed
    /// opportunistically.
    #[must_use]
    pub fn lookup(&self, edge: EdgeId, now: Tick) -> LiveLookup {
        let Some(entry) = self.entries.get(&edge) else {
            return LiveLookup::Missing;
        };
        let snapshot = *entry;
        drop(entry);
        if snapshot.valid_until_ticks <= now {
            if self.cleanup_on_read {
                self.entries.remove(&edge);
            }
            return LiveLookup::Expired;
        }
        if snapshot.speed_factor <= 0.0 {
            return LiveLookup::Blocked;
        }
        LiveLookup::Active(snapshot.speed_factor)
    }

    /// Applies a batch of updates under the write lock, enforcing
    /// `max_live_overrides` per the configured [`CapacityPolicy`], and
    /// reports what happened (spec §4.1).
    ///
    /// All updates in `batch` are validated before any are applied; if
    /// validation fails, the overlay is left unchanged and an error is
    /// returned. Updates already expired on arrival (`valid_until_ticks
    /// <= now`) are never inserted and are counted in
    /// `rejected_expired`.
    pub fn apply_batch(&self, batch: &[LiveUpdate], now: Tick) -> TaroResult<BatchApplyResult> {
        let validated: Vec<LiveUpdate> = batch
            .iter()
            .map(|u| u.validate())
            .collect::<TaroResult<_>>()?;
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut result = BatchApplyResult::default();
        let mut fresh = Vec::with_capacity(validated.len());
        for update in validated {
            if update.valid_until_ticks <= now {
                result.rejected_expired += 1;
            } else {
                fresh.push(update);
            }
        }

        let incoming_new_keys = fresh
            .iter()
            .filter(|u| !self.entries.contains_key(&u.edge))
            .count();
        let projected_len = self.entries.len() + incoming_new_keys;

        if projected_len > self.capacity {
            match self.capacity_policy {
                CapacityPolicy::RejectBatch => {
                    result.rejected_capacity = fresh.len();
                    return Ok(result);
                }
                CapacityPolicy::EvictExpiredThenReject => {
                    result.evicted_expired = self.evict_expired(now);
                    let incoming_new_keys = fresh
                        .iter()
                        .filter(|u| !self.entries.contains_key(&u.edge))
                        .count();
                    if self.entries.len() + incoming_new_keys > self.capacity {
                        result.rejected_capacity = fresh.len();
                        return Ok(result);
                    }
                }
                CapacityPolicy::EvictOldestExpiry => {
                    result.evicted_expired = self.evict_expired(now);
                    let incoming_new_keys = fresh
                        .iter()
                        .filter(|u| !self.entries.contains_key(&u.edge))
                        .count();
                    let projected = self.entries.len() + incoming_new_keys;
                    if projected > self.capacity {
                        result.evicted_oldest = self.evict_oldest(projected - self.capacity);
                    }
                }
            }
        }

        for update in fresh {
            self.entries.insert(
                update.edge,
                LiveOverlayEntry {
                    speed_factor: update.speed_factor,
                    valid_until_ticks: update.valid_until_ticks,
                },
            );
            result.accepted += 1;
        }
        Ok(result)
    }

    /// Removes up to `max_removals` entries whose `valid_until_ticks` has
    /// passed `now` (smallest edge id first, for determinism), returning
    /// the number actually removed. Intended to be invoked periodically
    /// by a maintenance scheduler outside this crate, per spec §4.1.
    pub fn run_scheduled_sweep(&self, now: Tick, max_removals: usize) -> usize {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut expired: Vec<EdgeId> = self
            .entries
            .iter()
            .filter(|e| e.value().valid_until_ticks <= now)
            .map(|e| *e.key())
            .collect();
        expired.sort_unstable();
        let removed = expired.len().min(max_removals);
        for edge in expired.into_iter().take(removed) {
            self.entries.remove(&edge);
        }
        removed
    }

    /// Removes all entries unconditionally.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.entries.clear();
    }

    /// Removes every entry whose `valid_until_ticks` has passed `now`
    /// (`now >= valid_until_ticks`), returning the number removed.
    fn evict_expired(&self, now: Tick) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, v| v.valid_until_ticks > now);
        before - self.entries.len()
    }

    /// Evicts the `count` entries with the smallest `valid_until_ticks`,
    /// tie-broken by smallest edge id, returning the number removed.
    fn evict_oldest(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let mut by_expiry: Vec<(EdgeId, Tick)> = self
            .entries
            .iter()
            .map(|e| (*e.key(), e.value().valid_until_ticks))
            .collect();
        by_expiry.sort_by_key(|&(edge, expiry)| (expiry, edge));
        let mut removed = 0;
        for (edge, _) in by_expiry.into_iter().take(count) {
            self.entries.remove(&edge);
            removed += 1;
        }
        removed
    }
}
