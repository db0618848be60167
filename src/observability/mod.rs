//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, JSON by default)
//!     → metrics.rs (forward outcome, skip and request counters)
//!
//! Consumers:
//!     → stdout, collected by the platform log pipeline
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every per-record log event
//! - Callers never see forwarding outcomes; logs and metrics are the only record

pub mod logging;
pub mod metrics;
