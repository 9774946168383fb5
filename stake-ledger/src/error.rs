//! Error types for balance accounting

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Balance accounting errors
#[derive(Error, Debug)]
pub enum Error {
    /// Cache miss or unresolved validator index
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected cache insert
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Balance increase would exceed the representable range
    #[error("Balance overflow for validator {index}: {current} + {delta} exceeds the u64 range")]
    Overflow {
        /// Validator whose balance was being increased
        index: u64,
        /// Balance before the mutation
        current: u64,
        /// Requested increase
        delta: u64,
    },

    /// Audit append failed; the balance mutation it followed is unaffected
    #[error("Audit write failed: {0}")]
    AuditWrite(String),

    /// Beacon-state accessor failure
    #[error("State access failed: {0}")]
    State(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
