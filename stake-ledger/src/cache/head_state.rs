//! Sync-committee head-state cache
//!
//! Sync-committee duty assignment needs a recent post-Altair state keyed
//! by the slot it was produced for. Only the latest is ever relevant, so
//! the cache holds exactly one entry and overwrite is the eviction.

use crate::error::{Error, Result};
use crate::state::{BeaconStateView, Slot};
use parking_lot::Mutex;

/// Single-entry cache of the most recent head state usable for
/// sync-committee processing.
pub struct SyncCommitteeHeadStateCache<S> {
    entry: Mutex<Option<(Slot, S)>>,
}

impl<S: BeaconStateView + Clone> SyncCommitteeHeadStateCache<S> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// Store `state` for `slot`, replacing any previous entry.
    ///
    /// Rejects an absent state and any version predating Altair, the
    /// oldest fork carrying sync-committee fields; a rejected put leaves
    /// the prior entry untouched.
    pub fn put(&self, slot: Slot, state: Option<S>) -> Result<()> {
        let state =
            state.ok_or_else(|| Error::InvalidInput("cannot cache an absent state".into()))?;
        if !state.version().has_sync_committee() {
            return Err(Error::InvalidInput(format!(
                "{:?} state predates sync committees",
                state.version()
            )));
        }
        *self.entry.lock() = Some((slot, state));
        Ok(())
    }

    /// State previously stored for exactly `slot`.
    pub fn get(&self, slot: Slot) -> Result<S> {
        let entry = self.entry.lock();
        match entry.as_ref() {
            Some((cached_slot, state)) if *cached_slot == slot => Ok(state.clone()),
            _ => Err(Error::NotFound(format!(
                "no head state cached for slot {}",
                slot
            ))),
        }
    }
}

impl<S: BeaconStateView + Clone> Default for SyncCommitteeHeadStateCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
