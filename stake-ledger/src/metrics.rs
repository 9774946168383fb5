//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `ledger_balance_increases_total` - Balance increases applied
//! - `ledger_balance_decreases_total` - Balance decreases applied
//! - `ledger_balance_cache_hits_total` - Effective-balance cache hits
//! - `ledger_balance_cache_misses_total` - Effective-balance cache misses
//! - `ledger_audit_records_total` - Audit records appended
//! - `ledger_audit_failures_total` - Audit append failures

use prometheus::{IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Balance increases applied
    pub increases_total: IntCounter,

    /// Balance decreases applied
    pub decreases_total: IntCounter,

    /// Effective-balance cache hits
    pub balance_cache_hits: IntCounter,

    /// Effective-balance cache misses
    pub balance_cache_misses: IntCounter,

    /// Audit records appended
    pub audit_records_total: IntCounter,

    /// Audit append failures
    pub audit_failures_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let increases_total = IntCounter::with_opts(Opts::new(
            "ledger_balance_increases_total",
            "Balance increases applied",
        ))?;
        registry.register(Box::new(increases_total.clone()))?;

        let decreases_total = IntCounter::with_opts(Opts::new(
            "ledger_balance_decreases_total",
            "Balance decreases applied",
        ))?;
        registry.register(Box::new(decreases_total.clone()))?;

        let balance_cache_hits = IntCounter::with_opts(Opts::new(
            "ledger_balance_cache_hits_total",
            "Effective-balance cache hits",
        ))?;
        registry.register(Box::new(balance_cache_hits.clone()))?;

        let balance_cache_misses = IntCounter::with_opts(Opts::new(
            "ledger_balance_cache_misses_total",
            "Effective-balance cache misses",
        ))?;
        registry.register(Box::new(balance_cache_misses.clone()))?;

        let audit_records_total = IntCounter::with_opts(Opts::new(
            "ledger_audit_records_total",
            "Audit records appended",
        ))?;
        registry.register(Box::new(audit_records_total.clone()))?;

        let audit_failures_total = IntCounter::with_opts(Opts::new(
            "ledger_audit_failures_total",
            "Audit append failures",
        ))?;
        registry.register(Box::new(audit_failures_total.clone()))?;

        Ok(Self {
            increases_total,
            decreases_total,
            balance_cache_hits,
            balance_cache_misses,
            audit_records_total,
            audit_failures_total,
            registry,
        })
    }

    /// Record a balance increase
    pub fn record_increase(&self) {
        self.increases_total.inc();
    }

    /// Record a balance decrease
    pub fn record_decrease(&self) {
        self.decreases_total.inc();
    }

    /// Record an effective-balance cache hit
    pub fn record_balance_cache_hit(&self) {
        self.balance_cache_hits.inc();
    }

    /// Record an effective-balance cache miss
    pub fn record_balance_cache_miss(&self) {
        self.balance_cache_misses.inc();
    }

    /// Record an appended audit record
    pub fn record_audit_append(&self) {
        self.audit_records_total.inc();
    }

    /// Record a failed audit append
    pub fn record_audit_failure(&self) {
        self.audit_failures_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.increases_total.get(), 0);
        assert_eq!(metrics.audit_records_total.get(), 0);
    }

    #[test]
    fn test_record_mutations() {
        let metrics = Metrics::new().unwrap();
        metrics.record_increase();
        metrics.record_increase();
        metrics.record_decrease();

        assert_eq!(metrics.increases_total.get(), 2);
        assert_eq!(metrics.decreases_total.get(), 1);
    }

    #[test]
    fn test_record_cache_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_balance_cache_miss();
        metrics.record_balance_cache_hit();
        metrics.record_balance_cache_hit();

        assert_eq!(metrics.balance_cache_hits.get(), 2);
        assert_eq!(metrics.balance_cache_misses.get(), 1);
    }
}
