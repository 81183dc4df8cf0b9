//! Prometheus metrics for the node.
//!
//! [`NodeMetrics`] owns the [`Registry`] that `GET /metrics` encodes. The
//! HTTP layer registers its own request counters into the same registry.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Histogram,
    HistogramOpts, IntCounter, Opts, Registry,
};

pub struct NodeMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Sweeps of ended proposals that ran to completion.
    pub sweeps: IntCounter,
    /// Sweeps that failed to list proposals.
    pub sweep_failures: IntCounter,
    /// Proposals moved to a terminal outcome by the sweep.
    pub proposals_finalized: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    pub sweep_duration_ms: Histogram,
}

impl NodeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let sweeps = register_int_counter_with_registry!(
            Opts::new("squad_sweeps_total", "Completed sweeps of ended proposals"),
            registry
        )?;
        let sweep_failures = register_int_counter_with_registry!(
            Opts::new("squad_sweep_failures_total", "Sweeps that could not list proposals"),
            registry
        )?;
        let proposals_finalized = register_int_counter_with_registry!(
            Opts::new(
                "squad_proposals_finalized_total",
                "Proposals finalized by the sweep"
            ),
            registry
        )?;
        let sweep_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new("squad_sweep_duration_ms", "Sweep duration in milliseconds")
                .buckets(prometheus::exponential_buckets(0.5, 2.0, 14)?),
            registry
        )?;

        Ok(Self {
            registry,
            sweeps,
            sweep_failures,
            proposals_finalized,
            sweep_duration_ms,
        })
    }
}
