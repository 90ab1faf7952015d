//! Prometheus metrics for request dispatch.

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a request claimed by `handler`.
pub fn record_request(handler: &'static str, elapsed: Duration) {
    counter!("nano_requests_total", "handler" => handler).increment(1);
    histogram!("nano_dispatch_duration_ms", "handler" => handler)
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record a failed request.
pub fn record_error(handler: &'static str, status: u16) {
    counter!(
        "nano_request_errors_total",
        "handler" => handler,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a request no handler claimed.
pub fn record_unmatched() {
    counter!("nano_unmatched_requests_total").increment(1);
}
