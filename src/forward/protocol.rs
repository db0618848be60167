//! Fluent Forward protocol v1, Message mode.
//!
//! ```text
//! [tag: str, time: int, record: map, option: map]
//! ```
//!
//! Each message is one self-delimiting MessagePack array; no framing is added.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::{Map, Value};

/// Per-message options. Always sent, usually empty.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct MessageOptions(BTreeMap<String, Value>);

impl MessageOptions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One forwarded unit: a tag, a Unix timestamp and a flat attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub tag: String,
    pub timestamp_seconds: i64,
    pub record: Map<String, Value>,
    pub options: MessageOptions,
}

impl OutboundMessage {
    pub fn new(tag: impl Into<String>, timestamp_seconds: i64, record: Map<String, Value>) -> Self {
        Self {
            tag: tag.into(),
            timestamp_seconds,
            record,
            options: MessageOptions::default(),
        }
    }

    /// Encode as a MessagePack Message-mode entry.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_tuple(4)?;
        entry.serialize_element(&self.tag)?;
        entry.serialize_element(&self.timestamp_seconds)?;
        entry.serialize_element(&self.record)?;
        entry.serialize_element(&self.options)?;
        entry.end()
    }
}
