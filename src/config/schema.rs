//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the Firehose gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Downstream forward-protocol target.
    pub forward: ForwardConfig,

    /// Delivery contract settings (shared secret, classification key).
    pub firehose: FirehoseConfig,

    /// Liveness/readiness check settings.
    pub health: HealthConfig,

    /// Shutdown behaviour.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080"). A bare ":8080" binds every
    /// IPv4 interface.
    pub bind_address: String,

    /// Largest delivery body the handler will buffer, in bytes.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    /// The bind address as a socket address, if it parses.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self.bind_address.strip_prefix(':') {
            Some(port) => port
                .parse::<u16>()
                .ok()
                .map(|port| SocketAddr::from(([0, 0, 0, 0], port))),
            None => self.bind_address.parse().ok(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Forward-protocol target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Receiver address as `host:port`.
    pub address: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Per-message write timeout in milliseconds.
    pub write_timeout_ms: u64,

    /// Minimum time between reconnect attempts after the session breaks,
    /// in milliseconds. Sends inside the window fail immediately.
    pub reconnect_backoff_ms: u64,
}

impl ForwardConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:24224".to_string(),
            connect_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            reconnect_backoff_ms: 5_000,
        }
    }
}

/// HTTP delivery contract settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FirehoseConfig {
    /// Shared secret expected in the access-key header.
    /// Empty means unset; validation rejects it.
    pub access_key: String,

    /// Key looked up inside the common-attributes map to classify a batch.
    pub event_type_header_name: String,
}

impl Default for FirehoseConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            event_type_header_name: "X-EVENT-TYPE".to_string(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// TCP dial budget for each health check, in milliseconds.
    pub dial_timeout_ms: u64,
}

impl HealthConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { dial_timeout_ms: 50 }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight deliveries may run after the stop signal.
    pub grace_period_secs: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}
