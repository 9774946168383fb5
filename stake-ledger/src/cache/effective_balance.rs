//! Total-active-balance cache
//!
//! Computing total active balance is an O(V) scan over the full registry,
//! and state transition needs the value several times per epoch with V in
//! the hundreds of thousands. Entries are keyed by a fingerprint of
//! (epoch, validators root), so advancing the epoch or changing the
//! validator-set composition misses and forces a rescan.

use crate::error::{Error, Result};
use crate::state::BeaconStateView;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// Bounded last-write-wins cache of total active balance.
///
/// Capacity 1 suffices while a single transition pipeline advances epochs
/// monotonically; the value is read repeatedly for the same epoch before
/// the pipeline moves on.
pub struct EffectiveBalanceCache {
    entries: Mutex<VecDeque<([u8; 32], u64)>>,
    capacity: usize,
    slots_per_epoch: u64,
}

impl EffectiveBalanceCache {
    /// Create a cache retaining up to `capacity` fingerprints.
    pub fn new(capacity: usize, slots_per_epoch: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            slots_per_epoch,
        }
    }

    fn fingerprint<S: BeaconStateView>(&self, state: &S) -> [u8; 32] {
        let epoch = state.slot() / self.slots_per_epoch;
        let mut hasher = Sha256::new();
        hasher.update(epoch.to_le_bytes());
        hasher.update(state.validators_root());
        hasher.finalize().into()
    }

    /// Cached total for the state's fingerprint.
    pub fn get<S: BeaconStateView>(&self, state: &S) -> Result<u64> {
        let key = self.fingerprint(state);
        let entries = self.entries.lock();
        entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, total)| *total)
            .ok_or_else(|| Error::NotFound("total active balance for state fingerprint".into()))
    }

    /// Store `total` for the state's fingerprint, evicting the oldest entry
    /// once capacity is reached.
    pub fn put<S: BeaconStateView>(&self, state: &S, total: u64) -> Result<()> {
        let key = self.fingerprint(state);
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = total;
            return Ok(());
        }
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back((key, total));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ForkVersion;
    use crate::testutil::{TestState, TestValidator};

    fn state_with_validators(slot: u64, count: usize) -> TestState {
        let mut state = TestState::new(slot, ForkVersion::Altair);
        for _ in 0..count {
            state.push_validator(TestValidator::default(), 32_000_000_000);
        }
        state
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = EffectiveBalanceCache::new(1, 32);
        let state = state_with_validators(0, 2);

        assert!(matches!(cache.get(&state), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_put_then_get() {
        let cache = EffectiveBalanceCache::new(1, 32);
        let state = state_with_validators(0, 2);

        cache.put(&state, 64_000_000_000).unwrap();
        assert_eq!(cache.get(&state).unwrap(), 64_000_000_000);
    }

    #[test]
    fn test_epoch_advance_invalidates() {
        let cache = EffectiveBalanceCache::new(1, 32);
        let mut state = state_with_validators(0, 2);

        cache.put(&state, 64_000_000_000).unwrap();

        // Same epoch, later slot: still a hit.
        state.set_slot(31);
        assert!(cache.get(&state).is_ok());

        // Next epoch: miss.
        state.set_slot(32);
        assert!(matches!(cache.get(&state), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_registry_change_invalidates() {
        let cache = EffectiveBalanceCache::new(1, 32);
        let mut state = state_with_validators(0, 2);

        cache.put(&state, 64_000_000_000).unwrap();
        state.push_validator(TestValidator::default(), 32_000_000_000);

        assert!(matches!(cache.get(&state), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_capacity_one_is_last_write_wins() {
        let cache = EffectiveBalanceCache::new(1, 32);
        let state_a = state_with_validators(0, 1);
        let state_b = state_with_validators(32, 1);

        cache.put(&state_a, 1).unwrap();
        cache.put(&state_b, 2).unwrap();

        assert!(cache.get(&state_a).is_err());
        assert_eq!(cache.get(&state_b).unwrap(), 2);
    }

    #[test]
    fn test_larger_capacity_retains_both() {
        let cache = EffectiveBalanceCache::new(2, 32);
        let state_a = state_with_validators(0, 1);
        let state_b = state_with_validators(32, 1);

        cache.put(&state_a, 1).unwrap();
        cache.put(&state_b, 2).unwrap();

        assert_eq!(cache.get(&state_a).unwrap(), 1);
        assert_eq!(cache.get(&state_b).unwrap(), 2);
    }

    #[test]
    fn test_put_same_fingerprint_replaces() {
        let cache = EffectiveBalanceCache::new(2, 32);
        let state = state_with_validators(0, 1);

        cache.put(&state, 1).unwrap();
        cache.put(&state, 2).unwrap();

        assert_eq!(cache.get(&state).unwrap(), 2);
    }
}
