//! Federation metrics.
//!
//! Counters and histograms for federated read operations. These complement the
//! structured logging that records per-collection captured failures.

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Federated requests counter.
pub const REQUESTS: &str = "mosaic_federation_requests_total";

/// Captured per-backend failures counter.
pub const BACKEND_FAILURES: &str = "mosaic_federation_backend_failures_total";

/// Federated request duration histogram.
pub const REQUEST_DURATION: &str = "mosaic_federation_request_duration_seconds";

/// Registers all federation metric descriptions.
///
/// Call this once at application startup after initializing the metrics
/// recorder.
pub fn register_metrics() {
    describe_counter!(REQUESTS, "Total federated read requests");
    describe_counter!(
        BACKEND_FAILURES,
        "Total per-backend failures captured during federation"
    );
    describe_histogram!(
        REQUEST_DURATION,
        "Duration of federated read requests in seconds"
    );
}

/// Records one federated request and its duration.
pub fn record_request(operation: &str, duration_secs: f64) {
    let labels = [("operation", operation.to_string())];

    counter!(REQUESTS, &labels).increment(1);
    histogram!(REQUEST_DURATION, &labels).record(duration_secs);
}

/// Records one captured backend failure.
pub fn record_backend_failure(kind: &'static str) {
    counter!(BACKEND_FAILURES, "kind" => kind).increment(1);
}
