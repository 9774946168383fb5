//! Beacon API validator-status mapping
//!
//! The REST transport that fetches validator status from a remote node
//! lives outside this crate; this module pins the status-string contract
//! and the seam a remote provider implements.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a validator as reported by a beacon node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    /// Deposit processed, not yet in the activation queue
    Deposited,
    /// Queued for activation
    Pending,
    /// Active
    Active,
    /// Active and exiting
    Exiting,
    /// Active and slashed
    Slashing,
    /// Exited, whether slashed, withdrawable or withdrawn
    Exited,
}

impl ValidatorStatus {
    /// Map a Beacon API status string to a status.
    pub fn from_api_str(status: &str) -> Option<Self> {
        match status {
            "pending_initialized" => Some(ValidatorStatus::Deposited),
            "pending_queued" => Some(ValidatorStatus::Pending),
            "active_ongoing" => Some(ValidatorStatus::Active),
            "active_exiting" => Some(ValidatorStatus::Exiting),
            "active_slashed" => Some(ValidatorStatus::Slashing),
            "exited_unslashed" | "exited_slashed" | "withdrawal_possible" | "withdrawal_done" => {
                Some(ValidatorStatus::Exited)
            }
            _ => None,
        }
    }
}

/// Remote source of validator statuses.
///
/// The HTTP client implementing this is external glue; the trait marks the
/// seam it plugs into.
pub trait StatusProvider {
    /// Status for the validator with `pubkey`.
    fn validator_status(&self, pubkey: &[u8; 48]) -> crate::Result<ValidatorStatus>;
}

/// True for a 0x-prefixed 32-byte hex root.
pub fn is_valid_root(root: &str) -> bool {
    root.len() == 66
        && root.starts_with("0x")
        && root[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ValidatorStatus::from_api_str("pending_initialized"),
            Some(ValidatorStatus::Deposited)
        );
        assert_eq!(
            ValidatorStatus::from_api_str("pending_queued"),
            Some(ValidatorStatus::Pending)
        );
        assert_eq!(
            ValidatorStatus::from_api_str("active_ongoing"),
            Some(ValidatorStatus::Active)
        );
        assert_eq!(
            ValidatorStatus::from_api_str("active_exiting"),
            Some(ValidatorStatus::Exiting)
        );
        assert_eq!(
            ValidatorStatus::from_api_str("active_slashed"),
            Some(ValidatorStatus::Slashing)
        );
        for s in [
            "exited_unslashed",
            "exited_slashed",
            "withdrawal_possible",
            "withdrawal_done",
        ] {
            assert_eq!(ValidatorStatus::from_api_str(s), Some(ValidatorStatus::Exited));
        }
        assert_eq!(ValidatorStatus::from_api_str("bogus"), None);
    }

    #[test]
    fn test_valid_root() {
        let root = format!("0x{}", "ab".repeat(32));
        assert!(is_valid_root(&root));

        assert!(!is_valid_root("0x1234"));
        assert!(!is_valid_root(&format!("0y{}", "ab".repeat(32))));
        assert!(!is_valid_root(&format!("0x{}zz", "ab".repeat(31))));
    }
}
