//! Hot-path caches for state transition

pub mod effective_balance;
pub mod head_state;

pub use effective_balance::EffectiveBalanceCache;
pub use head_state::SyncCommitteeHeadStateCache;
