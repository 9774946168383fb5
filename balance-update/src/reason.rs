//! Closed set of protocol-defined balance change reasons

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a validator balance changed.
///
/// The set is closed and the ordinals and identifier strings are a wire
/// contract: audit log consumers key on the exact spellings returned by
/// [`Reason::id`]. Renaming an identifier is a breaking format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Reason {
    /// Unit-test sentinel, excluded from production attribution
    #[serde(rename = "unknown")]
    Test = 0,
    /// Attester rewarded for a timely attestation
    AttesterAttestation = 1,
    /// Attester rewarded for a correct source vote
    AttesterAttestationSource = 2,
    /// Attester rewarded for a correct target vote
    AttesterAttestationTarget = 3,
    /// Attester rewarded for a correct head vote
    AttesterHead = 4,
    /// Attester penalised under the inactivity regime
    AttesterInactivity = 5,
    /// Proposer rewarded for included attestations
    ProposerAttestations = 6,
    /// Proposer rewarded for the block proposal
    ProposerProposal = 7,
    /// Proposer rewarded for including a whistleblowing report
    ProposerWhistleblowing = 8,
    /// Deposit processed for the validator
    ValidatorDeposit = 9,
    /// Validator slashed
    ValidatorSlashing = 10,
    /// Whistleblower rewarded for reporting
    ValidatorWhistleblowing = 11,
    /// Withdrawal processed for the validator
    ValidatorWithdrawal = 12,
}

impl Reason {
    /// Size of the closed reason set, including the test sentinel.
    pub const COUNT: usize = 13;

    /// Every reason in ordinal order.
    pub const ALL: [Reason; Reason::COUNT] = [
        Reason::Test,
        Reason::AttesterAttestation,
        Reason::AttesterAttestationSource,
        Reason::AttesterAttestationTarget,
        Reason::AttesterHead,
        Reason::AttesterInactivity,
        Reason::ProposerAttestations,
        Reason::ProposerProposal,
        Reason::ProposerWhistleblowing,
        Reason::ValidatorDeposit,
        Reason::ValidatorSlashing,
        Reason::ValidatorWhistleblowing,
        Reason::ValidatorWithdrawal,
    ];

    /// Stable identifier used in the audit wire format.
    pub fn id(&self) -> &'static str {
        match self {
            Reason::Test => "unknown",
            Reason::AttesterAttestation => "attesterAttestation",
            Reason::AttesterAttestationSource => "attesterAttestationSource",
            Reason::AttesterAttestationTarget => "attesterAttestationTarget",
            Reason::AttesterHead => "attesterHead",
            Reason::AttesterInactivity => "attesterInactivity",
            Reason::ProposerAttestations => "proposerAttestations",
            Reason::ProposerProposal => "proposerProposal",
            Reason::ProposerWhistleblowing => "proposerWhistleblowing",
            Reason::ValidatorDeposit => "validatorDeposit",
            Reason::ValidatorSlashing => "validatorSlashing",
            Reason::ValidatorWhistleblowing => "validatorWhistleblowing",
            Reason::ValidatorWithdrawal => "validatorWithdrawal",
        }
    }

    /// Fixed ordinal of this reason.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_dense() {
        for (i, reason) in Reason::ALL.iter().enumerate() {
            assert_eq!(reason.ordinal(), i);
        }
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(Reason::Test.id(), "unknown");
        assert_eq!(Reason::AttesterAttestation.id(), "attesterAttestation");
        assert_eq!(Reason::AttesterInactivity.id(), "attesterInactivity");
        assert_eq!(Reason::ProposerProposal.id(), "proposerProposal");
        assert_eq!(Reason::ValidatorDeposit.id(), "validatorDeposit");
        assert_eq!(Reason::ValidatorWithdrawal.id(), "validatorWithdrawal");
    }

    #[test]
    fn test_serde_matches_wire_id() {
        for reason in Reason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.id()));
        }
    }
}
