//! Record payload decoding.
//!
//! Every record is base64 text. CloudWatch Logs records are additionally a
//! gzip-compressed JSON subscription envelope; CloudFront records are plain
//! log lines.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::firehose::classify::EventType;
use crate::firehose::types::RawRecord;

/// Why a single record could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 record data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid gzip payload: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("invalid cloudwatch logs payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::Base64(_) => "invalid_base64",
            DecodeError::Gzip(_) => "invalid_gzip",
            DecodeError::Json(_) => "invalid_json",
        }
    }
}

/// CloudWatch Logs subscription filter envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudWatchLogsEvent {
    pub owner: String,
    pub log_group: String,
    pub log_stream: String,
    pub message_type: String,
    pub subscription_filters: Vec<String>,
    pub log_events: Vec<LogEvent>,
}

/// One log line inside a [`CloudWatchLogsEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogEvent {
    pub id: String,
    pub message: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// A record after decoding, tagged with the schema it was decoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    CloudWatchLogs(CloudWatchLogsEvent),
    Cloudfront(String),
}

/// Decode `record` according to `event_type`.
///
/// Returns `Ok(None)` for [`EventType::Unknown`]: no decode is attempted.
pub fn decode(
    record: &RawRecord,
    event_type: EventType,
) -> Result<Option<DecodedEvent>, DecodeError> {
    match event_type {
        EventType::CloudWatchLogs => decode_cloudwatch_logs(&record.data)
            .map(|event| Some(DecodedEvent::CloudWatchLogs(event))),
        EventType::Cloudfront => decode_cloudfront(&record.data)
            .map(|line| Some(DecodedEvent::Cloudfront(line))),
        EventType::Unknown => Ok(None),
    }
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(data.trim())?)
}

/// base64 → gunzip → JSON.
pub fn decode_cloudwatch_logs(data: &str) -> Result<CloudWatchLogsEvent, DecodeError> {
    let compressed = decode_base64(data)?;
    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(DecodeError::Gzip)?;
    Ok(serde_json::from_slice(&json)?)
}

/// base64 → text. Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_cloudfront(data: &str) -> Result<String, DecodeError> {
    let bytes = decode_base64(data)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
