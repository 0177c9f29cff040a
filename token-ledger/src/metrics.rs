//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `token_ledger_operations_total{op}` - Successful operations
//! - `token_ledger_rejections_total{op,reason}` - Rejected operations
//! - `token_ledger_operation_duration_seconds{op}` - Time spent applying an operation
//! - `token_ledger_holders` - Accounts with a non-zero balance

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Successful operations by kind
    pub operations_total: IntCounterVec,

    /// Rejected operations by kind and reason
    pub rejections_total: IntCounterVec,

    /// Apply duration histogram
    pub operation_duration: HistogramVec,

    /// Number of holders
    pub holders: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new("token_ledger_operations_total", "Successful ledger operations"),
            &["op"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("token_ledger_rejections_total", "Rejected ledger operations"),
            &["op", "reason"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "token_ledger_operation_duration_seconds",
                "Time spent applying an operation",
            )
            .buckets(vec![0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001]),
            &["op"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let holders = IntGauge::new("token_ledger_holders", "Accounts with a non-zero balance")?;
        registry.register(Box::new(holders.clone()))?;

        Ok(Self {
            operations_total,
            rejections_total,
            operation_duration,
            holders,
            registry,
        })
    }

    /// Record a successful operation
    pub fn record_success(&self, op: &str, duration_seconds: f64) {
        self.operations_total.with_label_values(&[op]).inc();
        self.operation_duration
            .with_label_values(&[op])
            .observe(duration_seconds);
    }

    /// Record a rejected operation
    pub fn record_rejection(&self, op: &str, reason: &str) {
        self.rejections_total.with_label_values(&[op, reason]).inc();
    }

    /// Update holder count
    pub fn set_holders(&self, holders: usize) {
        self.holders.set(i64::try_from(holders).unwrap_or(i64::MAX));
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
