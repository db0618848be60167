//! Decoded events → outbound forward messages.
//!
//! CloudFront records map 1:1. A CloudWatch Logs record carries many log
//! lines in one envelope and expands to one message per log event, in
//! delivery order.

use serde_json::{Map, Value};

use crate::firehose::classify::EventType;
use crate::firehose::decode::{CloudWatchLogsEvent, DecodedEvent};
use crate::forward::OutboundMessage;

/// Build the messages for one decoded record.
///
/// `now_seconds` stamps messages whose payload has no time of its own.
pub fn transform(event: DecodedEvent, request_id: &str, now_seconds: i64) -> Vec<OutboundMessage> {
    match event {
        DecodedEvent::Cloudfront(line) => vec![cloudfront_message(line, now_seconds)],
        DecodedEvent::CloudWatchLogs(envelope) => cloudwatch_messages(envelope, request_id),
    }
}

pub fn cloudfront_message(line: String, now_seconds: i64) -> OutboundMessage {
    let tag = EventType::Cloudfront.as_str();
    let mut record = Map::new();
    record.insert("data".into(), Value::String(line));
    record.insert("type".into(), Value::from(tag));
    OutboundMessage::new(tag, now_seconds, record)
}

pub fn cloudwatch_messages(
    envelope: CloudWatchLogsEvent,
    request_id: &str,
) -> Vec<OutboundMessage> {
    let tag = EventType::CloudWatchLogs.as_str();
    let CloudWatchLogsEvent {
        owner,
        log_group,
        log_stream,
        log_events,
        ..
    } = envelope;

    log_events
        .into_iter()
        .map(|event| {
            let mut record = Map::new();
            record.insert("owner".into(), Value::from(owner.as_str()));
            record.insert("logGroupName".into(), Value::from(log_group.as_str()));
            record.insert("logStreamName".into(), Value::from(log_stream.as_str()));
            record.insert("message".into(), Value::String(event.message));
            record.insert("timestamp".into(), Value::from(event.timestamp));
            record.insert("requestID".into(), Value::from(request_id));
            record.insert("type".into(), Value::from(tag));
            OutboundMessage::new(tag, event.timestamp, record)
        })
        .collect()
}
