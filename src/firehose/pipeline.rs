//! Per-batch decode → transform → forward loop.
//!
//! Records are handled strictly in body order, each to completion before the
//! next. Nothing that goes wrong with one record reaches the HTTP response:
//! failures are logged, counted and reported back as [`RecordOutcome`]s.

use crate::firehose::classify::EventType;
use crate::firehose::decode::{self, DecodeError};
use crate::firehose::transform;
use crate::firehose::types::{now_seconds, DeliveryBatch};
use crate::forward::ForwardAdapter;
use crate::observability::metrics;

/// Why a record produced no messages.
#[derive(Debug)]
pub enum SkipReason {
    /// The batch was not classified; records pass through untouched.
    UnknownEventType,
    Decode(DecodeError),
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::UnknownEventType => "unknown_event_type",
            SkipReason::Decode(e) => e.reason(),
        }
    }
}

/// What happened to one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Messages were built; `sent + failed` of them were attempted.
    Forwarded { sent: usize, failed: usize },
    Skipped(SkipReason),
}

/// Outcomes for a whole batch, indexed like `DeliveryBatch::records`.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                RecordOutcome::Forwarded { sent, .. } => *sent,
                RecordOutcome::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                RecordOutcome::Forwarded { failed, .. } => *failed,
                RecordOutcome::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Skipped(_)))
            .count()
    }
}

/// Run every record of `batch` through the pipeline for `event_type`.
pub async fn process_batch(
    batch: &DeliveryBatch,
    event_type: EventType,
    request_id: &str,
    forwarder: &ForwardAdapter,
) -> BatchReport {
    let mut report = BatchReport {
        outcomes: Vec::with_capacity(batch.records.len()),
    };

    for (index, record) in batch.records.iter().enumerate() {
        let outcome = match decode::decode(record, event_type) {
            Ok(Some(event)) => {
                let messages = transform::transform(event, request_id, now_seconds());
                let mut sent = 0;
                let mut failed = 0;
                for message in &messages {
                    match forwarder.send(event_type, request_id, message).await {
                        Ok(()) => sent += 1,
                        Err(_) => failed += 1,
                    }
                }
                RecordOutcome::Forwarded { sent, failed }
            }
            Ok(None) => RecordOutcome::Skipped(SkipReason::UnknownEventType),
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    event_type = %event_type,
                    record_index = index,
                    error = %e,
                    "failed to decode record"
                );
                RecordOutcome::Skipped(SkipReason::Decode(e))
            }
        };

        if let RecordOutcome::Skipped(reason) = &outcome {
            metrics::record_skip(event_type, reason.label());
        }
        report.outcomes.push(outcome);
    }

    report
}
