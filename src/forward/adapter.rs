//! Observed sending: counters and logs around the shared forwarder.

use std::sync::Arc;

use crate::firehose::classify::EventType;
use crate::forward::protocol::OutboundMessage;
use crate::forward::{ForwardError, Forwarder};
use crate::observability::metrics;

/// Cheap-to-clone handle every request handler sends through.
///
/// Outcomes are counted as `{type, status}` and logged; the caller decides
/// what to do with the returned error (the delivery pipeline only records it).
#[derive(Clone)]
pub struct ForwardAdapter {
    inner: Arc<dyn Forwarder>,
}

impl ForwardAdapter {
    pub fn new(inner: Arc<dyn Forwarder>) -> Self {
        Self { inner }
    }

    pub async fn send(
        &self,
        event_type: EventType,
        request_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), ForwardError> {
        match self.inner.send(message).await {
            Ok(()) => {
                metrics::record_forward(event_type, true);
                tracing::debug!(
                    request_id = %request_id,
                    event_type = %event_type,
                    tag = %message.tag,
                    "message sent to forward receiver"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_forward(event_type, false);
                tracing::error!(
                    request_id = %request_id,
                    event_type = %event_type,
                    tag = %message.tag,
                    error = %e,
                    "failed to send message"
                );
                Err(e)
            }
        }
    }
}
