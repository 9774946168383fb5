//! Netted balance delta pair

use serde::{Deserialize, Serialize};

/// Net change applied to a validator balance within one accounting scope.
///
/// Increases and decreases cancel against each other as they are recorded,
/// so at most one of the two fields is non-zero at any time and the pair
/// always reads as a single signed figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    /// Net increase in Gwei
    pub increase: u64,

    /// Net decrease in Gwei
    pub decrease: u64,
}

impl BalanceUpdate {
    /// Record an increase of `delta`, netting against any pending decrease.
    ///
    /// No overflow check: deltas mirror the checked arithmetic already
    /// applied to the underlying balance, so the cumulative value is capped
    /// by the range of the balance it tracks.
    pub fn add(&mut self, delta: u64) {
        self.increase += delta;
        if self.decrease == 0 {
            return;
        }
        if self.increase > self.decrease {
            self.increase -= self.decrease;
            self.decrease = 0;
        } else {
            self.decrease -= self.increase;
            self.increase = 0;
        }
    }

    /// Record a decrease of `delta`, netting against any pending increase.
    pub fn sub(&mut self, delta: u64) {
        self.decrease += delta;
        if self.increase == 0 {
            return;
        }
        if self.increase > self.decrease {
            self.increase -= self.decrease;
            self.decrease = 0;
        } else {
            self.decrease -= self.increase;
            self.increase = 0;
        }
    }

    /// True when no net change is pending.
    pub fn is_zero(&self) -> bool {
        self.increase == 0 && self.decrease == 0
    }
}
