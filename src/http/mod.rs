//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing and panic layers)
//!     → handlers.rs (deliver: auth, request ID, method, body)
//!     → request.rs (header contract, constant-time key check)
//!     → firehose::process_batch (per-record decode and forward)
//!     → response.rs (JSON envelope for success and every error)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use response::{ApiError, ApiErrorResponse};
pub use server::{build_router, AppState, HttpServer};
