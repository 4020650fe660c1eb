// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the ingress-hosts controller.
//!
//! All metrics carry the `ingress_hosts_` prefix and live in
//! [`METRICS_REGISTRY`], which the metrics server exposes on `/metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ingress_hosts::metrics::record_cycle_success;
//!
//! record_cycle_success(std::time::Duration::from_millis(12), 3);
//! ```

use crate::constants::METRICS_NAMESPACE;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconcile Cycle Metrics
// ============================================================================

/// Total number of reconcile cycles by outcome
///
/// Labels:
/// - `status`: `success`, `list_error` or `write_error`
pub static RECONCILE_CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconcile_cycles_total"),
        "Total number of reconcile cycles by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered once");
    counter
});

/// Duration of reconcile cycles in seconds
pub static RECONCILE_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconcile_duration_seconds"),
        "Duration of reconcile cycles in seconds",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]);
    let histogram = Histogram::with_opts(opts).expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registered once");
    histogram
});

/// Number of entries in the most recently written hosts file
pub static HOSTS_ENTRIES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_entries"),
        "Number of entries in the most recently written hosts file",
    )
    .expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registered once");
    gauge
});

/// Ingresses left out of the hosts file
///
/// Labels:
/// - `reason`: `missing_annotation` or `missing_address`
pub static SKIPPED_RESOURCES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_skipped_resources_total"),
        "Ingresses left out of the hosts file by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered once");
    counter
});

/// Unix timestamp of the last successful hosts file write
pub static LAST_SUCCESS_TIMESTAMP_SECONDS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_last_success_timestamp_seconds"),
        "Unix timestamp of the last successful hosts file write",
    )
    .expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registered once");
    gauge
});

/// Whether the ingress cache has completed its initial sync (0 or 1)
pub static CACHE_SYNCED: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_cache_synced"),
        "Whether the ingress cache has completed its initial sync",
    )
    .expect("valid metric definition");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registered once");
    gauge
});

// ============================================================================
// Recording helpers
// ============================================================================

/// Record a cycle that wrote the hosts file.
pub fn record_cycle_success(duration: Duration, entries: usize) {
    RECONCILE_CYCLES_TOTAL
        .with_label_values(&["success"])
        .inc();
    RECONCILE_DURATION_SECONDS.observe(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    HOSTS_ENTRIES.set(entries as f64);
    #[allow(clippy::cast_precision_loss)]
    LAST_SUCCESS_TIMESTAMP_SECONDS.set(chrono::Utc::now().timestamp() as f64);
}

/// Record a cycle that ended early with `status` (`list_error` or `write_error`).
pub fn record_cycle_failure(status: &str, duration: Duration) {
    RECONCILE_CYCLES_TOTAL.with_label_values(&[status]).inc();
    RECONCILE_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record `count` ingresses skipped for `reason`.
pub fn record_skipped(reason: &str, count: usize) {
    if count == 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    SKIPPED_RESOURCES_TOTAL
        .with_label_values(&[reason])
        .inc_by(count as f64);
}

/// Record whether the cache is synced.
pub fn set_cache_synced(synced: bool) {
    CACHE_SYNCED.set(if synced { 1.0 } else { 0.0 });
}

/// Gather all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
