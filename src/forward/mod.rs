//! Forward-protocol output subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundMessage (built by firehose::transform)
//!     → adapter.rs (count + log every outcome)
//!     → Forwarder trait (client.rs in production, fakes in tests)
//!     → protocol.rs (MessagePack Message-mode entry)
//!     → single shared TCP session to the log processor
//! ```
//!
//! # Design Decisions
//! - One session per process, connected before the listener starts
//! - Writes are serialized by the client; senders never interleave frames
//! - A failed send is reported once and never retried

pub mod adapter;
pub mod client;
pub mod protocol;

use async_trait::async_trait;

pub use adapter::ForwardAdapter;
pub use client::ForwardClient;
pub use protocol::{MessageOptions, OutboundMessage};

/// Errors from the forward client.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("connection failed to {target}: {source}")]
    ConnectionFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("write timed out")]
    Timeout,

    #[error("no connection to forward receiver")]
    NotConnected,

    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// Something that can deliver one message downstream.
///
/// Implementations must be safe to call from many requests at once.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), ForwardError>;
}
