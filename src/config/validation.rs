//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Refuse to start without a shared secret
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("access key is required (set ACCESS_KEY)")]
    MissingAccessKey,

    #[error("invalid listen address '{0}'")]
    InvalidListenAddress(String),

    #[error("invalid forward address '{0}': expected host:port")]
    InvalidForwardAddress(String),

    #[error("event type header name must not be empty")]
    EmptyEventTypeKey,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.firehose.access_key.is_empty() {
        errors.push(ValidationError::MissingAccessKey);
    }

    if config.firehose.event_type_header_name.is_empty() {
        errors.push(ValidationError::EmptyEventTypeKey);
    }

    if config.listener.socket_addr().is_none() {
        errors.push(ValidationError::InvalidListenAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if split_host_port(&config.forward.address).is_none() {
        errors.push(ValidationError::InvalidForwardAddress(
            config.forward.address.clone(),
        ));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_body_bytes"));
    }
    if config.forward.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("forward.connect_timeout_ms"));
    }
    if config.forward.write_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("forward.write_timeout_ms"));
    }
    if config.forward.reconnect_backoff_ms == 0 {
        errors.push(ValidationError::ZeroValue("forward.reconnect_backoff_ms"));
    }
    if config.health.dial_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("health.dial_timeout_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Split `host:port` into its parts. IPv6 hosts must be bracketed.
pub fn split_host_port(address: &str) -> Option<(&str, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() || (host.contains(':') && !address.starts_with('[')) {
        return None;
    }
    let port = port.parse::<u16>().ok()?;
    Some((host, port))
}
