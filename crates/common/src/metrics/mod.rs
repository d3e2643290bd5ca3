//! Metrics and observability utilities
//!
//! Prometheus metrics for the answer pipeline with standardized naming.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all DocQA metrics
pub const METRICS_PREFIX: &str = "docqa";

/// Histogram buckets for request latency (in seconds).
/// Summarization and generation dominate, so the upper end is wide.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms - question bank hits
    0.025,  // 25ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 60s
    120.0,  // 120s - default request timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_resolutions_total", METRICS_PREFIX),
        Unit::Count,
        "Answered questions by answer source and intent"
    );

    describe_counter!(
        format!("{}_resolution_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Failed resolutions by error kind"
    );

    describe_counter!(
        format!("{}_model_calls_total", METRICS_PREFIX),
        Unit::Count,
        "Summarizer and generator calls by status"
    );

    describe_histogram!(
        format!("{}_model_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Summarizer and generator latency in seconds"
    );

    describe_histogram!(
        format!("{}_document_load_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Time spent decoding the source document"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a finished resolution
pub fn record_resolution(source: &str, intent: &str) {
    counter!(
        format!("{}_resolutions_total", METRICS_PREFIX),
        "source" => source.to_string(),
        "intent" => intent.to_string()
    )
    .increment(1);
}

/// Record a failed resolution
pub fn record_resolution_error(kind: &str) {
    counter!(
        format!("{}_resolution_errors_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a summarizer or generator call
pub fn record_model_call(duration_secs: f64, model: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_model_calls_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_model_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    }
}

/// Record how long decoding the document took
pub fn record_document_load(duration_secs: f64) {
    histogram!(format!("{}_document_load_seconds", METRICS_PREFIX)).record(duration_secs);
}
