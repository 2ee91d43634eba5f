//! Prometheus metrics for the report pipeline.
//!
//! This module provides metrics for:
//! - Cycles (outcome, duration)
//! - Data volume (rows in the last fetched dataset)
//! - Publishing and HTTP retries

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Cycle Metrics
// =============================================================================

/// Cycles run, by outcome.
pub static CYCLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("p2n_cycles_total", "Total report cycles"),
        &["outcome"], // "published", "unchanged", "failed"
    )
    .unwrap()
});

/// Cycle duration in seconds.
pub static CYCLE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("p2n_cycle_duration_seconds", "Duration of a report cycle")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

/// Rows in the most recently fetched raw dataset.
pub static ROWS_FETCHED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "p2n_rows_fetched",
        "Rows in the most recently fetched raw dataset",
    )
    .unwrap()
});

// =============================================================================
// Publishing Metrics
// =============================================================================

/// Files uploaded, by kind.
pub static FILES_PUBLISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("p2n_files_published_total", "Total files uploaded"),
        &["kind"], // "xlsx", "txt"
    )
    .unwrap()
});

/// HTTP retries, by remote.
pub static HTTP_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("p2n_http_retries_total", "Total retried HTTP requests"),
        &["target"], // "pretix", "nextcloud"
    )
    .unwrap()
});

/// Every metric, for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CYCLES_TOTAL.clone()),
        Box::new(CYCLE_DURATION.clone()),
        Box::new(ROWS_FETCHED.clone()),
        Box::new(FILES_PUBLISHED.clone()),
        Box::new(HTTP_RETRIES.clone()),
    ]
}
