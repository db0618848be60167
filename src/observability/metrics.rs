//! Metrics collection and exposition.
//!
//! # Metrics
//! - `firehose_gateway_events_total` (counter): forwarded messages by `type`, `status`
//! - `firehose_gateway_records_skipped_total` (counter): dropped records by `type`, `reason`
//! - `firehose_gateway_requests_total` (counter): delivery calls by response `status`
//!
//! # Design Decisions
//! - Prometheus recorder installed once per process, shared by every server
//! - Counter updates are plain atomic increments through the `metrics` facade

use std::sync::OnceLock;

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::firehose::EventType;

pub const EVENTS_TOTAL: &str = "firehose_gateway_events_total";
pub const RECORDS_SKIPPED_TOTAL: &str = "firehose_gateway_records_skipped_total";
pub const REQUESTS_TOTAL: &str = "firehose_gateway_requests_total";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder (first call only) and return its handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "metrics recorder already installed");
            }
            describe();
            handle
        })
        .clone()
}

fn describe() {
    metrics::describe_counter!(EVENTS_TOTAL, "Number of events processed by type");
    metrics::describe_counter!(
        RECORDS_SKIPPED_TOTAL,
        "Number of records dropped before forwarding"
    );
    metrics::describe_counter!(REQUESTS_TOTAL, "Number of delivery requests by response status");
}

/// Record one forward attempt.
pub fn record_forward(event_type: EventType, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(EVENTS_TOTAL, "type" => event_type.as_str(), "status" => status).increment(1);
}

/// Record a record that produced no messages.
pub fn record_skip(event_type: EventType, reason: &'static str) {
    counter!(RECORDS_SKIPPED_TOTAL, "type" => event_type.as_str(), "reason" => reason).increment(1);
}

/// Record a completed delivery call.
pub fn record_request(status: u16) {
    counter!(REQUESTS_TOTAL, "status" => status.to_string()).increment(1);
}
