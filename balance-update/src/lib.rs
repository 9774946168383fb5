//! Per-reason validator balance delta tracking
//!
//! Value types used by the state-transition layer to attribute every
//! validator balance change to a protocol-defined reason.
//!
//! # Invariants
//!
//! - Netting: after any mutation, at most one of a delta's
//!   increase/decrease fields is non-zero
//! - Closed reason set: reasons are a fixed enumeration with stable
//!   wire identifiers; audit log consumers depend on the exact spellings

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod breakdown;
pub mod reason;
pub mod update;

// Re-exports
pub use breakdown::Breakdown;
pub use reason::Reason;
pub use update::BalanceUpdate;
