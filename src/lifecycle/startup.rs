//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Connect the forward client before any traffic is accepted
//! - Bind the listener and serve until the stop signal
//! - Close the forward session once the server has stopped
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::forward::{ForwardAdapter, ForwardClient, ForwardError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to connect to forward receiver: {0}")]
    Forward(#[from] ForwardError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A started gateway: forwarder connected, listener bound.
pub struct Gateway {
    config: GatewayConfig,
    client: Arc<ForwardClient>,
    listener: TcpListener,
    shutdown: Shutdown,
}

impl Gateway {
    /// Bring up every subsystem. `config` must already be validated.
    pub async fn start(config: GatewayConfig) -> Result<Self, StartupError> {
        metrics::init_metrics();

        let client = Arc::new(ForwardClient::new(config.forward.clone()));
        client.connect().await?;

        let bind_error = |source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        };
        let addr = config.listener.socket_addr().ok_or_else(|| {
            bind_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a socket address",
            ))
        })?;
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;

        Ok(Self {
            config,
            client,
            listener,
            shutdown: Shutdown::new(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `stop` resolves, drain, then disconnect the forwarder.
    pub async fn serve<F>(self, stop: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Gateway {
            config,
            client,
            listener,
            shutdown,
        } = self;

        let forwarder = ForwardAdapter::new(client.clone());
        let server = HttpServer::new(&config, forwarder, metrics::init_metrics());
        let server_shutdown = shutdown.subscribe();

        tokio::spawn(async move {
            stop.await;
            tracing::info!("shutdown requested, draining in-flight deliveries");
            shutdown.trigger();
        });

        let result = server.run(listener, server_shutdown).await;

        if let Err(e) = client.disconnect().await {
            tracing::warn!(error = %e, "failed to close forward session cleanly");
        }

        result.map_err(StartupError::Serve)?;
        tracing::info!("gateway exited");
        Ok(())
    }
}
