//! Metrics and observability utilities
//!
//! Provides Prometheus-style metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Minipress metrics
pub const METRICS_PREFIX: &str = "minipress";

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
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

    // Intake metrics
    describe_counter!(
        format!("{}_contact_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total contact requests persisted"
    );

    describe_counter!(
        format!("{}_contact_rejections_total", METRICS_PREFIX),
        Unit::Count,
        "Total contact submissions rejected by validation"
    );

    // Notification metrics
    describe_counter!(
        format!("{}_notifications_enqueued_total", METRICS_PREFIX),
        Unit::Count,
        "Total notifications handed to the dispatcher"
    );

    describe_counter!(
        format!("{}_notifications_sent_total", METRICS_PREFIX),
        Unit::Count,
        "Total notifications delivered by the mail transport"
    );

    describe_counter!(
        format!("{}_notifications_failed_total", METRICS_PREFIX),
        Unit::Count,
        "Total notification delivery failures"
    );

    describe_counter!(
        format!("{}_notifications_dropped_total", METRICS_PREFIX),
        Unit::Count,
        "Total notifications dropped before delivery"
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

/// Record the outcome of a contact intake attempt
pub fn record_contact_intake(accepted: bool) {
    if accepted {
        counter!(format!("{}_contact_requests_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(format!("{}_contact_rejections_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a notification entering the dispatch queue
pub fn record_notification_enqueued() {
    counter!(format!("{}_notifications_enqueued_total", METRICS_PREFIX)).increment(1);
}

/// Record a notification delivery outcome
pub fn record_notification_outcome(success: bool) {
    if success {
        counter!(format!("{}_notifications_sent_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(format!("{}_notifications_failed_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a notification dropped before delivery
pub fn record_notification_dropped(reason: &'static str) {
    counter!(
        format!("{}_notifications_dropped_total", METRICS_PREFIX),
        "reason" => reason
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/articles");
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_notification_helpers() {
        record_notification_enqueued();
        record_notification_outcome(true);
        record_notification_outcome(false);
        record_notification_dropped("queue_full");
        record_contact_intake(true);
        record_contact_intake(false);
    }
}
