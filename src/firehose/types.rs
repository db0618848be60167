//! Wire types of the HTTP delivery contract.
//!
//! <https://docs.aws.amazon.com/firehose/latest/dev/httpdeliveryrequestresponse.html>

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One HTTP delivery call's body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,

    /// Delivery time in Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<RawRecord>,
}

/// A record as delivered. `data` stays base64 text until the decoder runs,
/// so one bad record cannot fail the whole batch parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
}

/// Request-level metadata carried in the common-attributes header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonAttributes {
    #[serde(rename = "commonAttributes", default)]
    pub common_attributes: HashMap<String, String>,
}

/// The synchronous acknowledgement returned for every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,

    /// Response time in Unix milliseconds.
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ResponseBody {
    /// Acknowledge receipt of `request_id`.
    pub fn accepted(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp: now_millis(),
            error_message: None,
        }
    }

    /// Error envelope. `request_id` is echoed when the caller supplied one.
    pub fn error(request_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            request_id: request_id.unwrap_or_default(),
            timestamp: now_millis(),
            error_message: Some(message.into()),
        }
    }
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Wall-clock time in Unix seconds.
pub fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
