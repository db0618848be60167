//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health/live | GET /health/ready
//!     → check.rs (TCP dial to the forward receiver, bounded timeout)
//!     → 200 {"forwarder": "OK"} or 503 {"forwarder": "<dial error>"}
//! ```
//!
//! # Design Decisions
//! - Checks dial a fresh connection; the shared forward session is untouched
//! - Liveness and readiness run the same check: the gateway is useless
//!   without its downstream

pub mod check;

pub use check::{dial, live, ready, DialError, HealthTarget};
