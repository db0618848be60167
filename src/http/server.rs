//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the delivery, metrics and health handlers
//! - Wire up middleware (tracing, panic capture)
//! - Serve on a bound listener until shutdown, with a bounded drain

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, get};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{deliver, metrics_handler};
use super::response::panic_response;
use crate::config::{FirehoseConfig, GatewayConfig};
use crate::forward::ForwardAdapter;
use crate::health::{self, HealthTarget};
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub firehose: Arc<FirehoseConfig>,
    pub max_body_bytes: usize,
    pub forwarder: ForwardAdapter,
    pub metrics: PrometheusHandle,
    pub health: Arc<HealthTarget>,
}

impl AppState {
    pub fn new(
        config: &GatewayConfig,
        forwarder: ForwardAdapter,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            firehose: Arc::new(config.firehose.clone()),
            max_body_bytes: config.listener.max_body_bytes,
            forwarder,
            metrics,
            health: Arc::new(HealthTarget {
                forward_address: config.forward.address.clone(),
                dial_timeout: config.health.dial_timeout(),
            }),
        }
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let delivery = Router::new()
        .route("/", any(deliver))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .merge(delivery)
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    grace_period: Duration,
}

impl HttpServer {
    pub fn new(
        config: &GatewayConfig,
        forwarder: ForwardAdapter,
        metrics: PrometheusHandle,
    ) -> Self {
        let state = AppState::new(config, forwarder, metrics);
        Self {
            router: build_router(state),
            grace_period: config.shutdown.grace_period(),
        }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests for at
    /// most the grace period.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let deadline = shutdown.resubscribe();
        let grace = self.grace_period;
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = async {
                shutdown::wait(deadline).await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(
                    grace_period = ?grace,
                    "drain deadline reached, abandoning in-flight requests"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
