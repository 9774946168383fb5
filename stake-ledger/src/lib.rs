//! StakeLedger Core
//!
//! Validator balance accounting and caching for the state-transition hot
//! path of a consensus client.
//!
//! # Architecture
//!
//! - **Checked mutation**: balance increases fail on overflow before any
//!   side effect; decreases saturate at zero by protocol rule
//! - **Reason attribution**: every mutation is attributed to a closed set
//!   of protocol reasons and netted per validator per scope
//! - **Hot-path caches**: total active stake and the sync-committee head
//!   state are cached so state transition never rescans the registry
//! - **Audit trail**: one JSON line per mutation, appended through an
//!   injected sink; audit failure never rolls back a mutation
//!
//! # Invariants
//!
//! - Deterministic arithmetic: every node computes identical balances
//! - A cached total is valid only for the exact state fingerprint it was
//!   computed from
//! - Aggregate balances never fall below the protocol minimum increment

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod state;
pub mod status;
pub mod testutil;

// Re-exports
pub use audit::{AuditRecord, AuditSink, JsonlSink, NullSink};
pub use cache::{EffectiveBalanceCache, SyncCommitteeHeadStateCache};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::BalanceLedger;
pub use state::{
    BeaconStateMut, BeaconStateView, Epoch, ForkVersion, Slot, ValidatorIndex, ValidatorView,
};
