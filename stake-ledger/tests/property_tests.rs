//! Property-based tests for balance accounting invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Netting: at most one of increase/decrease is non-zero after any op
//! - Round trip: increase then decrease restores the balance
//! - Saturation: a decrease never produces a negative-equivalent result
//! - Floor: aggregate balances never fall below the protocol increment

use balance_update::{BalanceUpdate, Breakdown, Reason};
use proptest::prelude::*;
use stake_ledger::ledger::{decrease_balance_with_val, increase_balance_with_val};
use stake_ledger::state::ForkVersion;
use stake_ledger::testutil::{TestState, TestValidator};
use stake_ledger::{BalanceLedger, Config, NullSink};
use std::sync::Arc;

/// Strategy for generating production reasons (the test sentinel at
/// ordinal 0 is excluded from attribution)
fn reason_strategy() -> impl Strategy<Value = Reason> {
    (1usize..Reason::COUNT).prop_map(|ordinal| Reason::ALL[ordinal])
}

/// Strategy for generating add/sub operation sequences
fn op_strategy() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 0u64..1_000_000_000u64), 0..64)
}

fn signed(bu: BalanceUpdate) -> i128 {
    if bu.decrease != 0 {
        -(bu.decrease as i128)
    } else {
        bu.increase as i128
    }
}

fn test_ledger() -> BalanceLedger {
    BalanceLedger::new(&Config::default(), Arc::new(NullSink))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the netting invariant holds after every operation,
    /// not just at the end of a sequence
    #[test]
    fn prop_netting_invariant_holds_continuously(ops in op_strategy()) {
        let mut bu = BalanceUpdate::default();
        let mut net: i128 = 0;

        for (is_add, delta) in ops {
            if is_add {
                bu.add(delta);
                net += delta as i128;
            } else {
                bu.sub(delta);
                net -= delta as i128;
            }

            prop_assert!(bu.increase == 0 || bu.decrease == 0);
            prop_assert_eq!(signed(bu), net);
        }
    }

    /// Property: a breakdown's total equals the signed sum of every
    /// operation applied to it, regardless of reason distribution
    #[test]
    fn prop_breakdown_total_matches_signed_sum(
        ops in prop::collection::vec(
            (any::<bool>(), 0u64..1_000_000_000u64, reason_strategy()),
            0..64,
        )
    ) {
        let mut breakdown = Breakdown::default();
        let mut net: i128 = 0;

        for (is_add, delta, reason) in ops {
            if is_add {
                breakdown.add(delta, reason);
                net += delta as i128;
            } else {
                breakdown.sub(delta, reason);
                net -= delta as i128;
            }
        }

        let total = breakdown.total();
        prop_assert!(total.increase == 0 || total.decrease == 0);
        prop_assert_eq!(signed(total), net);
    }

    /// Property: increase followed by decrease of the same amount
    /// restores the original balance
    #[test]
    fn prop_increase_then_decrease_round_trips(
        balance in 0u64..1_000_000_000_000u64,
        delta in 0u64..1_000_000_000_000u64,
        reason in reason_strategy(),
    ) {
        let ledger = test_ledger();
        let mut state = TestState::new(0, ForkVersion::Altair);
        let index = state.push_validator(TestValidator::default(), balance);

        ledger.increase_balance(&mut state, index, delta, reason).unwrap();
        ledger.decrease_balance(&mut state, index, delta, reason).unwrap();

        prop_assert_eq!(
            stake_ledger::BeaconStateMut::balance_at_index(&state, index).unwrap(),
            balance
        );
    }

    /// Property: a decrease larger than the balance yields exactly zero
    #[test]
    fn prop_decrease_saturates_at_zero(
        balance in 0u64..1_000_000u64,
        excess in 1u64..1_000_000u64,
    ) {
        prop_assert_eq!(decrease_balance_with_val(balance, balance + excess), 0);
    }

    /// Property: the flattened increase matches checked u64 addition
    #[test]
    fn prop_increase_with_val_matches_checked_add(
        current in any::<u64>(),
        delta in any::<u64>(),
    ) {
        match current.checked_add(delta) {
            Some(sum) => {
                prop_assert_eq!(increase_balance_with_val(0, current, delta).unwrap(), sum);
            }
            None => prop_assert!(increase_balance_with_val(0, current, delta).is_err()),
        }
    }

    /// Property: total_balance never falls below the protocol increment,
    /// for any indices set including the empty set
    #[test]
    fn prop_total_balance_floored(
        balances in prop::collection::vec(0u64..100_000_000u64, 0..16),
        pick in prop::collection::vec(any::<u64>(), 0..8),
    ) {
        let ledger = test_ledger();
        let mut state = TestState::new(0, ForkVersion::Altair);
        for &balance in &balances {
            let validator = TestValidator {
                effective_balance: balance,
                ..TestValidator::default()
            };
            state.push_validator(validator, balance);
        }

        let indices: Vec<u64> = pick.iter().map(|&i| i % 32).collect();
        let total = ledger.total_balance(&state, &indices);

        prop_assert!(total >= Config::default().protocol.effective_balance_increment);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use stake_ledger::{BeaconStateMut, JsonlSink};

    #[test]
    fn test_full_accounting_scope_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.audit.path = dir.path().join("balance-audit.jsonl");

        let sink = Arc::new(JsonlSink::open(&config.audit.path).unwrap());
        let ledger = BalanceLedger::new(&config, sink);

        let mut state = TestState::new(96, ForkVersion::Altair);
        let proposer = state.push_validator(
            TestValidator {
                public_key: [0x11; 48],
                ..TestValidator::default()
            },
            32_000_000_000,
        );
        let offender = state.push_validator(
            TestValidator {
                public_key: [0x22; 48],
                ..TestValidator::default()
            },
            32_000_000_000,
        );

        // One slot's worth of accounting.
        ledger
            .increase_balance(&mut state, proposer, 25_000, Reason::ProposerProposal)
            .unwrap();
        ledger
            .increase_balance(&mut state, proposer, 5_000, Reason::ProposerAttestations)
            .unwrap();
        ledger
            .decrease_balance(&mut state, offender, 500_000_000, Reason::ValidatorSlashing)
            .unwrap();
        ledger.flush_breakdowns(&state);
        ledger.shutdown().unwrap();

        assert_eq!(state.balance_at_index(proposer).unwrap(), 32_000_030_000);
        assert_eq!(state.balance_at_index(offender).unwrap(), 31_500_000_000);

        // Three mutation records plus two summaries, all parseable.
        let content = std::fs::read_to_string(&config.audit.path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 5);

        assert_eq!(lines[0]["reason"], "proposerProposal");
        assert_eq!(lines[0]["delta"], 25_000);
        assert_eq!(lines[0]["epoch"], 3);
        assert_eq!(lines[0]["slot"], 96);
        assert_eq!(lines[2]["delta"], -500_000_000);

        assert_eq!(lines[3]["index"], "0");
        assert_eq!(lines[3]["delta"], 30_000);
        assert_eq!(lines[3]["proposerProposal"], 25_000);
        assert_eq!(lines[4]["index"], "1");
        assert_eq!(lines[4]["validatorSlashing"], -500_000_000);
    }

    #[test]
    fn test_total_active_balance_cached_across_calls() {
        let ledger = test_ledger();
        let mut state = TestState::new(0, ForkVersion::Altair);
        for _ in 0..64 {
            state.push_validator(TestValidator::default(), 32_000_000_000);
        }

        let total = ledger.total_active_balance(&state).unwrap();
        assert_eq!(total, 64 * 32_000_000_000);

        for _ in 0..10 {
            assert_eq!(ledger.total_active_balance(&state).unwrap(), total);
        }
        assert_eq!(state.full_scans(), 1);
        assert_eq!(ledger.metrics().balance_cache_hits.get(), 10);
        assert_eq!(ledger.metrics().balance_cache_misses.get(), 1);
    }
}
