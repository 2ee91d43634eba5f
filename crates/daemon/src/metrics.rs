//! Prometheus metrics for the status server.
//!
//! Besides the pipeline metrics from `p2n_core::metrics`, this module tracks
//! requests to the status server and gauges refreshed from the runner status
//! on every scrape.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "p2n_http_request_duration_seconds",
            "Status server request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("p2n_http_requests_total", "Total status server requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

// =============================================================================
// Runner Metrics
// =============================================================================

/// Whether the cycle runner loop is active (1) or not (0).
pub static RUNNER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("p2n_runner_running", "Whether the cycle runner is active").unwrap()
});

/// Unix time of the last upload of reports.
pub static LAST_PUBLISHED_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "p2n_last_published_timestamp_seconds",
        "Unix time of the last report upload",
    )
    .unwrap()
});

/// Whether the most recent cycle failed (1) or not (0).
pub static LAST_CYCLE_FAILED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("p2n_last_cycle_failed", "Whether the most recent cycle failed").unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();

    // Runner
    registry
        .register(Box::new(RUNNER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_PUBLISHED_TIMESTAMP.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_CYCLE_FAILED.clone()))
        .unwrap();

    // Pipeline
    for metric in p2n_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Refresh the runner gauges from the current status.
pub async fn collect_dynamic_metrics(state: &AppState) {
    let status = state.runner_status().await;

    RUNNER_RUNNING.set(i64::from(status.running));
    if let Some(at) = status.last_published {
        LAST_PUBLISHED_TIMESTAMP.set(at.timestamp());
    }
    let failed = status
        .last_outcome
        .as_ref()
        .is_some_and(|outcome| outcome.is_failure());
    LAST_CYCLE_FAILED.set(i64::from(failed));
}
