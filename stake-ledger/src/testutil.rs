//! In-memory beacon state for tests
//!
//! Stands in for the external beacon-state component in unit and property
//! tests; never used on production paths. The state counts full registry
//! scans so cache behavior is observable.

use crate::error::{Error, Result};
use crate::state::{
    BeaconStateMut, BeaconStateView, Epoch, ForkVersion, Slot, ValidatorIndex, ValidatorView,
    FAR_FUTURE_EPOCH,
};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory validator record.
#[derive(Debug, Clone)]
pub struct TestValidator {
    /// BLS public key
    pub public_key: [u8; 48],
    /// Effective balance in Gwei
    pub effective_balance: u64,
    /// Activation epoch
    pub activation_epoch: Epoch,
    /// Exit epoch
    pub exit_epoch: Epoch,
}

impl Default for TestValidator {
    fn default() -> Self {
        Self {
            public_key: [0u8; 48],
            effective_balance: 32_000_000_000, // 32 ETH
            activation_epoch: 0,
            exit_epoch: FAR_FUTURE_EPOCH,
        }
    }
}

impl ValidatorView for TestValidator {
    fn effective_balance(&self) -> u64 {
        self.effective_balance
    }

    fn public_key(&self) -> [u8; 48] {
        self.public_key
    }

    fn activation_epoch(&self) -> Epoch {
        self.activation_epoch
    }

    fn exit_epoch(&self) -> Epoch {
        self.exit_epoch
    }
}

/// In-memory beacon state.
#[derive(Debug)]
pub struct TestState {
    slot: Slot,
    version: ForkVersion,
    parent_root: [u8; 32],
    validators: Vec<TestValidator>,
    balances: Vec<u64>,
    scans: AtomicU64,
}

impl TestState {
    /// Create an empty state at `slot`.
    pub fn new(slot: Slot, version: ForkVersion) -> Self {
        Self {
            slot,
            version,
            parent_root: [0u8; 32],
            validators: Vec::new(),
            balances: Vec::new(),
            scans: AtomicU64::new(0),
        }
    }

    /// Append a validator with its raw balance, returning its index.
    pub fn push_validator(&mut self, validator: TestValidator, balance: u64) -> ValidatorIndex {
        self.validators.push(validator);
        self.balances.push(balance);
        (self.validators.len() - 1) as ValidatorIndex
    }

    /// Advance the state to `slot`.
    pub fn set_slot(&mut self, slot: Slot) {
        self.slot = slot;
    }

    /// Set the parent root reported for the latest block header.
    pub fn set_parent_root(&mut self, root: [u8; 32]) {
        self.parent_root = root;
    }

    /// Number of full registry scans performed through
    /// [`BeaconStateView::for_each_validator`].
    pub fn full_scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }
}

impl Clone for TestState {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot,
            version: self.version,
            parent_root: self.parent_root,
            validators: self.validators.clone(),
            balances: self.balances.clone(),
            scans: AtomicU64::new(0),
        }
    }
}

impl BeaconStateView for TestState {
    type Validator = TestValidator;

    fn slot(&self) -> Slot {
        self.slot
    }

    fn version(&self) -> ForkVersion {
        self.version
    }

    fn validators_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for val in &self.validators {
            hasher.update(val.public_key);
            hasher.update(val.effective_balance.to_le_bytes());
            hasher.update(val.activation_epoch.to_le_bytes());
            hasher.update(val.exit_epoch.to_le_bytes());
        }
        hasher.finalize().into()
    }

    fn validator_count(&self) -> usize {
        self.validators.len()
    }

    fn validator_at_index(&self, index: ValidatorIndex) -> Result<&Self::Validator> {
        self.validators
            .get(index as usize)
            .ok_or_else(|| Error::NotFound(format!("validator {}", index)))
    }

    fn for_each_validator<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(ValidatorIndex, &Self::Validator) -> Result<()>,
    {
        self.scans.fetch_add(1, Ordering::Relaxed);
        for (index, val) in self.validators.iter().enumerate() {
            f(index as ValidatorIndex, val)?;
        }
        Ok(())
    }

    fn parent_root(&self) -> [u8; 32] {
        self.parent_root
    }
}

impl BeaconStateMut for TestState {
    fn balance_at_index(&self, index: ValidatorIndex) -> Result<u64> {
        self.balances
            .get(index as usize)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("balance for validator {}", index)))
    }

    fn update_balance_at_index(&mut self, index: ValidatorIndex, balance: u64) -> Result<()> {
        match self.balances.get_mut(index as usize) {
            Some(slot) => {
                *slot = balance;
                Ok(())
            }
            None => Err(Error::NotFound(format!("balance for validator {}", index))),
        }
    }
}
