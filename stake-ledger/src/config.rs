//! Configuration for balance accounting

use crate::state::{Epoch, Slot};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Audit sink configuration
    pub audit: AuditConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Protocol constants
    pub protocol: ProtocolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audit: AuditConfig::default(),
            cache: CacheConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

/// Audit sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines audit log path
    pub path: PathBuf,

    /// Disable to drop audit records instead of appending them
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/balance-audit.jsonl"),
            enabled: true,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Retained (fingerprint, total) entries in the effective-balance cache
    ///
    /// One entry suffices while a single pipeline advances epochs
    /// monotonically; raise it if concurrent pipelines process different
    /// epochs' views.
    pub effective_balance_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            effective_balance_capacity: 1,
        }
    }
}

/// Protocol constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Effective balance increment in Gwei; the floor for aggregate balances
    pub effective_balance_increment: u64,

    /// Slots per epoch
    pub slots_per_epoch: u64,

    /// Finality delay beyond which the inactivity leak engages
    pub min_epochs_to_inactivity_penalty: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            effective_balance_increment: 1_000_000_000, // 1 ETH in Gwei
            slots_per_epoch: 32,
            min_epochs_to_inactivity_penalty: 4,
        }
    }
}

impl ProtocolConfig {
    /// Epoch containing `slot`.
    pub fn epoch_of(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(path) = std::env::var("STAKE_LEDGER_AUDIT_PATH") {
            config.audit.path = PathBuf::from(path);
        }

        if let Ok(enabled) = std::env::var("STAKE_LEDGER_AUDIT_ENABLED") {
            config.audit.enabled = enabled == "1" || enabled.eq_ignore_ascii_case("true");
        }

        if let Ok(capacity) = std::env::var("STAKE_LEDGER_CACHE_CAPACITY") {
            config.cache.effective_balance_capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid STAKE_LEDGER_CACHE_CAPACITY: {}", e))
            })?;
        }

        Ok(config)
    }
}
