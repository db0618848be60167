//! Firehose HTTP delivery to Fluent Forward gateway library.

// Core subsystems
pub mod config;
pub mod firehose;
pub mod forward;
pub mod http;

// Cross-cutting concerns
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{Gateway, Shutdown};
