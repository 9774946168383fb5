//! Read/write access traits over the external beacon state
//!
//! The full beacon-state representation lives outside this crate; these
//! traits are the exact surface the accounting layer consumes from it.

use crate::error::Result;

/// Smallest protocol time unit; one block is expected per slot.
pub type Slot = u64;

/// Fixed-length group of consecutive slots.
pub type Epoch = u64;

/// Position of a validator in the registry.
pub type ValidatorIndex = u64;

/// Exit epoch of a validator that has not initiated exit.
pub const FAR_FUTURE_EPOCH: Epoch = u64::MAX;

/// Protocol upgrade tag of a consensus state.
///
/// Ordering is chronological; sync-committee fields exist from `Altair` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ForkVersion {
    /// Genesis fork
    Phase0,
    /// First fork carrying sync-committee data
    Altair,
    /// The merge fork
    Bellatrix,
    /// Withdrawals fork
    Capella,
}

impl ForkVersion {
    /// True when states of this version carry sync-committee fields.
    pub fn has_sync_committee(&self) -> bool {
        *self >= ForkVersion::Altair
    }
}

/// Read-only view of a single validator record.
pub trait ValidatorView {
    /// Stake rounded down to protocol increments, in Gwei.
    fn effective_balance(&self) -> u64;

    /// BLS public key.
    fn public_key(&self) -> [u8; 48];

    /// Epoch at which the validator became active.
    fn activation_epoch(&self) -> Epoch;

    /// Epoch at which the validator exits, [`FAR_FUTURE_EPOCH`] if none.
    fn exit_epoch(&self) -> Epoch;

    /// True when the validator is active at `epoch`.
    fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch() <= epoch && epoch < self.exit_epoch()
    }
}

/// Read-only view of a beacon state.
pub trait BeaconStateView {
    /// Concrete validator record type.
    type Validator: ValidatorView;

    /// Current slot.
    fn slot(&self) -> Slot;

    /// Fork version of this state.
    fn version(&self) -> ForkVersion;

    /// Identity of the validator registry.
    ///
    /// Changes whenever the composition of the validator set changes; two
    /// states with equal roots hold the same registry.
    fn validators_root(&self) -> [u8; 32];

    /// Number of validators in the registry.
    fn validator_count(&self) -> usize;

    /// Validator record at `index`.
    fn validator_at_index(&self, index: ValidatorIndex) -> Result<&Self::Validator>;

    /// Read-only iteration over every validator in index order.
    fn for_each_validator<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(ValidatorIndex, &Self::Validator) -> Result<()>;

    /// Parent root of the latest block header.
    fn parent_root(&self) -> [u8; 32];
}

/// Mutable balance access on top of the read-only view.
pub trait BeaconStateMut: BeaconStateView {
    /// Raw balance of the validator at `index`, in Gwei.
    fn balance_at_index(&self, index: ValidatorIndex) -> Result<u64>;

    /// Replace the raw balance of the validator at `index`.
    fn update_balance_at_index(&mut self, index: ValidatorIndex, balance: u64) -> Result<()>;
}
