//! Event-type classification from the common-attributes header.

use std::fmt;

use crate::firehose::types::CommonAttributes;

/// Schema used by every record of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Gzip-compressed CloudWatch Logs subscription envelopes.
    CloudWatchLogs,
    /// CloudFront real-time log lines, forwarded as opaque text.
    Cloudfront,
    /// Anything else. Records are dropped without error.
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CloudWatchLogs => "cloudwatchlogs",
            EventType::Cloudfront => "cloudfront",
            EventType::Unknown => "unknown",
        }
    }

    /// Map an attribute value onto the closed set. Unrecognised names are `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "cloudwatchlogs" => EventType::CloudWatchLogs,
            "cloudfront" => EventType::Cloudfront,
            _ => EventType::Unknown,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the event type of a batch.
///
/// `header` is the raw common-attributes header value (any UTF-8, not just
/// visible ASCII), `key` the configured attribute name holding the type. A
/// missing header, malformed JSON or an absent key all classify as
/// [`EventType::Unknown`]; this never fails.
pub fn classify(header: Option<&[u8]>, key: &str) -> EventType {
    let Some(raw) = header else {
        tracing::debug!("common attributes header absent");
        return EventType::Unknown;
    };

    let attributes: CommonAttributes = match serde_json::from_slice(raw) {
        Ok(attributes) => attributes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse common attributes");
            return EventType::Unknown;
        }
    };

    match attributes.common_attributes.get(key) {
        Some(value) => {
            let event_type = EventType::from_name(value);
            tracing::debug!(
                attribute = %key,
                value = %value,
                event_type = %event_type,
                "event type resolved"
            );
            event_type
        }
        None => {
            tracing::debug!(attribute = %key, "event type attribute absent");
            EventType::Unknown
        }
    }
}
