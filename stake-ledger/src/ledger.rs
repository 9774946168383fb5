//! Balance mutation and aggregate query operations
//!
//! This module ties together the per-reason breakdown, the
//! effective-balance cache and the audit sink into the API the
//! state-transition pipeline calls per validator per reason.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stake_ledger::{BalanceLedger, Config, JsonlSink};
//!
//! fn main() -> stake_ledger::Result<()> {
//!     let config = Config::default();
//!     let sink = Arc::new(JsonlSink::open(&config.audit.path)?);
//!     let ledger = BalanceLedger::new(&config, sink);
//!
//!     // Apply a deposit
//!     // ledger.increase_balance(&mut state, 0, amount, Reason::ValidatorDeposit)?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    audit::{AuditRecord, AuditSink, MutationRecord, SummaryRecord},
    cache::EffectiveBalanceCache,
    config::{Config, ProtocolConfig},
    error::{Error, Result},
    metrics::Metrics,
    state::{BeaconStateMut, BeaconStateView, Epoch, ValidatorIndex, ValidatorView},
};
use balance_update::{Breakdown, Reason};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Balance accounting API over an external beacon state.
pub struct BalanceLedger {
    /// Total-active-balance cache
    balance_cache: EffectiveBalanceCache,

    /// Audit record destination
    sink: Arc<dyn AuditSink>,

    /// Per-validator deltas accumulated since the last flush
    breakdowns: Mutex<BTreeMap<ValidatorIndex, Breakdown>>,

    /// Protocol constants
    protocol: ProtocolConfig,

    /// Metrics
    metrics: Metrics,
}

impl BalanceLedger {
    /// Create a ledger writing audit records to `sink`.
    pub fn new(config: &Config, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            balance_cache: EffectiveBalanceCache::new(
                config.cache.effective_balance_capacity,
                config.protocol.slots_per_epoch,
            ),
            sink,
            breakdowns: Mutex::new(BTreeMap::new()),
            protocol: config.protocol.clone(),
            metrics: Metrics::default(),
        }
    }

    /// Combined effective balance of `indices` in Gwei, floored at the
    /// protocol minimum increment to avoid downstream division by zero.
    ///
    /// Indices that do not resolve to a validator are skipped, not errors.
    pub fn total_balance<S: BeaconStateView>(
        &self,
        state: &S,
        indices: &[ValidatorIndex],
    ) -> u64 {
        let mut total: u64 = 0;
        for &index in indices {
            if let Ok(val) = state.validator_at_index(index) {
                total += val.effective_balance();
            }
        }
        total.max(self.protocol.effective_balance_increment)
    }

    /// Combined effective balance of validators active at the state's
    /// current epoch, floored at the protocol minimum increment.
    ///
    /// Served from the effective-balance cache when the state fingerprint
    /// matches; a miss performs a full registry scan and repopulates the
    /// cache. Cache errors other than a miss propagate.
    pub fn total_active_balance<S: BeaconStateView>(&self, state: &S) -> Result<u64> {
        match self.balance_cache.get(state) {
            Ok(total) => {
                self.metrics.record_balance_cache_hit();
                return Ok(total);
            }
            Err(Error::NotFound(_)) => {
                self.metrics.record_balance_cache_miss();
            }
            Err(e) => return Err(e),
        }

        let epoch = self.protocol.epoch_of(state.slot());
        let mut total: u64 = 0;
        state.for_each_validator(|_, val| {
            if val.is_active_at(epoch) {
                total += val.effective_balance();
            }
            Ok(())
        })?;

        let total = total.max(self.protocol.effective_balance_increment);
        self.balance_cache.put(state, total)?;
        Ok(total)
    }

    /// Increase the balance of the validator at `index` by `delta` Gwei.
    ///
    /// Fails before any side effect if the new balance would exceed the
    /// u64 range; silent wraparound would diverge state across nodes.
    pub fn increase_balance<S: BeaconStateMut>(
        &self,
        state: &mut S,
        index: ValidatorIndex,
        delta: u64,
        reason: Reason,
    ) -> Result<()> {
        let current = state.balance_at_index(index)?;
        let new_balance = increase_balance_with_val(index, current, delta)?;
        self.emit_mutation(state, index, delta, true, reason);
        self.metrics.record_increase();
        state.update_balance_at_index(index, new_balance)
    }

    /// Decrease the balance of the validator at `index` by `delta` Gwei,
    /// saturating at zero; a balance never goes negative regardless of
    /// the size of the penalty.
    pub fn decrease_balance<S: BeaconStateMut>(
        &self,
        state: &mut S,
        index: ValidatorIndex,
        delta: u64,
        reason: Reason,
    ) -> Result<()> {
        let current = state.balance_at_index(index)?;
        self.emit_mutation(state, index, delta, false, reason);
        self.metrics.record_decrease();
        state.update_balance_at_index(index, decrease_balance_with_val(current, delta))
    }

    /// Emit one netted summary record per validator touched since the
    /// last flush, in ascending index order, then reset the scope.
    pub fn flush_breakdowns<S: BeaconStateView>(&self, state: &S) {
        let drained = std::mem::take(&mut *self.breakdowns.lock());
        let slot = state.slot();
        let epoch = self.protocol.epoch_of(slot);

        for (index, breakdown) in drained {
            if breakdown.is_zero() {
                continue;
            }
            self.append_record(&AuditRecord::Summary(SummaryRecord {
                epoch,
                slot,
                index,
                breakdown,
            }));
        }
    }

    /// Flush and close the audit sink.
    pub fn shutdown(&self) -> Result<()> {
        self.sink.shutdown()
    }

    /// Get metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn emit_mutation<S: BeaconStateView>(
        &self,
        state: &S,
        index: ValidatorIndex,
        delta: u64,
        increase: bool,
        reason: Reason,
    ) {
        if delta == 0 || reason == Reason::Test {
            return;
        }

        {
            let mut breakdowns = self.breakdowns.lock();
            let entry = breakdowns.entry(index).or_default();
            if increase {
                entry.add(delta, reason);
            } else {
                entry.sub(delta, reason);
            }
        }

        let slot = state.slot();
        let epoch = self.protocol.epoch_of(slot);
        let key = match state.validator_at_index(index) {
            Ok(val) => val.public_key(),
            Err(_) => [0u8; 48],
        };
        let signed_delta = if increase {
            delta as i128
        } else {
            -(delta as i128)
        };

        tracing::info!(
            epoch,
            slot,
            index,
            delta = %signed_delta,
            reason = reason.id(),
            "Validator balance updated"
        );

        self.append_record(&AuditRecord::Mutation(MutationRecord {
            epoch,
            slot,
            parent_root: format!("0x{}", hex::encode(state.parent_root())),
            key: format!("0x{}", hex::encode(key)),
            delta: signed_delta,
            reason,
        }));
    }

    fn append_record(&self, record: &AuditRecord) {
        match self.sink.append(record) {
            Ok(()) => self.metrics.record_audit_append(),
            Err(e) => {
                self.metrics.record_audit_failure();
                tracing::error!(error = %e, "Failed to append audit record");
            }
        }
    }
}

/// Post-increase balance, or `Overflow` if the sum exceeds the u64 range.
///
/// Flattened variant of [`BalanceLedger::increase_balance`] for callers
/// already holding the raw balance; no side effects. `index` is used for
/// error attribution only.
pub fn increase_balance_with_val(
    index: ValidatorIndex,
    current: u64,
    delta: u64,
) -> Result<u64> {
    current.checked_add(delta).ok_or(Error::Overflow {
        index,
        current,
        delta,
    })
}

/// Post-decrease balance, saturating at zero.
///
/// Flattened variant of [`BalanceLedger::decrease_balance`]; underflow is
/// never an error by protocol rule.
pub fn decrease_balance_with_val(current: u64, delta: u64) -> u64 {
    current.saturating_sub(delta)
}

/// Epochs elapsed since the last finalized checkpoint.
pub fn finality_delay(prev_epoch: Epoch, finalized_epoch: Epoch) -> u64 {
    // The finalized checkpoint never exceeds the previous epoch.
    prev_epoch.saturating_sub(finalized_epoch)
}

/// True when the chain has gone long enough without finality that the
/// inactivity-leak penalty regime applies.
pub fn is_in_inactivity_leak(
    prev_epoch: Epoch,
    finalized_epoch: Epoch,
    min_epochs_to_inactivity_penalty: u64,
) -> bool {
    finality_delay(prev_epoch, finalized_epoch) > min_epochs_to_inactivity_penalty
}
