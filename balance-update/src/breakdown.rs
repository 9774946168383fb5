//! Fixed-size per-reason delta table

use crate::{BalanceUpdate, Reason};

/// Per-reason balance deltas for one validator within one accounting scope.
///
/// One slot per [`Reason`], indexed by ordinal. An instance is owned by
/// exactly one validator's processing window and discarded when the scope
/// ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown {
    slots: [BalanceUpdate; Reason::COUNT],
}

impl Breakdown {
    /// Record an increase of `delta` attributed to `reason`.
    pub fn add(&mut self, delta: u64, reason: Reason) {
        self.slots[reason.ordinal()].add(delta);
    }

    /// Record a decrease of `delta` attributed to `reason`.
    pub fn sub(&mut self, delta: u64, reason: Reason) {
        self.slots[reason.ordinal()].sub(delta);
    }

    /// Delta recorded for a single reason.
    pub fn get(&self, reason: Reason) -> BalanceUpdate {
        self.slots[reason.ordinal()]
    }

    /// Netted sum across every reason.
    ///
    /// Increases and decreases are totalled separately and netted once at
    /// the end, so a validator that both gained and lost stake in the same
    /// scope reports a single signed figure rather than two non-zero ones.
    pub fn total(&self) -> BalanceUpdate {
        let mut total_inc: u64 = 0;
        let mut total_dec: u64 = 0;
        for bu in &self.slots {
            if bu.increase != 0 {
                total_inc += bu.increase;
            }
            if bu.decrease != 0 {
                total_dec += bu.decrease;
            }
        }
        if total_inc != 0 && total_dec != 0 {
            if total_inc > total_dec {
                total_inc -= total_dec;
                total_dec = 0;
            } else {
                total_dec -= total_inc;
                total_inc = 0;
            }
        }
        BalanceUpdate {
            increase: total_inc,
            decrease: total_dec,
        }
    }

    /// True when every slot is zero.
    pub fn is_zero(&self) -> bool {
        self.slots.iter().all(BalanceUpdate::is_zero)
    }

    /// Non-zero entries in ordinal order.
    pub fn iter_non_zero(&self) -> impl Iterator<Item = (Reason, BalanceUpdate)> + '_ {
        Reason::ALL.iter().filter_map(move |&reason| {
            let bu = self.slots[reason.ordinal()];
            (!bu.is_zero()).then_some((reason, bu))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub_total() {
        let mut b = Breakdown::default();
        b.add(42, Reason::ValidatorDeposit);
        b.sub(84, Reason::ValidatorDeposit);

        assert_eq!(b.total().decrease, 42);
        assert_eq!(b.total().increase, 0);
    }

    #[test]
    fn test_total_nets_once_across_reasons() {
        let mut b = Breakdown::default();
        b.add(100, Reason::AttesterAttestation);
        b.sub(30, Reason::ValidatorSlashing);
        b.sub(30, Reason::AttesterInactivity);

        // 100 - 60, netted at the end rather than per slot
        let total = b.total();
        assert_eq!(total.increase, 40);
        assert_eq!(total.decrease, 0);
    }

    #[test]
    fn test_get_reads_single_slot() {
        let mut b = Breakdown::default();
        b.add(7, Reason::ProposerProposal);

        assert_eq!(b.get(Reason::ProposerProposal).increase, 7);
        assert!(b.get(Reason::AttesterHead).is_zero());
    }

    #[test]
    fn test_is_zero() {
        let mut b = Breakdown::default();
        assert!(b.is_zero());

        b.add(1, Reason::Test);
        assert!(!b.is_zero());
    }

    #[test]
    fn test_iter_non_zero_is_ordinal_ordered() {
        let mut b = Breakdown::default();
        b.sub(5, Reason::ValidatorSlashing);
        b.add(10, Reason::AttesterAttestation);

        let entries: Vec<_> = b.iter_non_zero().map(|(r, _)| r).collect();
        assert_eq!(
            entries,
            vec![Reason::AttesterAttestation, Reason::ValidatorSlashing]
        );
    }
}
