//! Downstream reachability checks.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tokio::net::TcpStream;

use crate::http::server::AppState;

const FORWARDER_CHECK: &str = "forwarder";

/// Where and how long the health checks dial.
#[derive(Debug, Clone)]
pub struct HealthTarget {
    pub forward_address: String,
    pub dial_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("dial {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dial {address}: timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },
}

/// Open and immediately drop a TCP connection to `address`.
pub async fn dial(address: &str, timeout: Duration) -> Result<(), DialError> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(source)) => Err(DialError::Dial {
            address: address.to_string(),
            source,
        }),
        Err(_) => Err(DialError::Timeout {
            address: address.to_string(),
            timeout,
        }),
    }
}

async fn check(state: &AppState) -> (StatusCode, Json<BTreeMap<&'static str, String>>) {
    let mut checks = BTreeMap::new();
    let status = match dial(&state.health.forward_address, state.health.dial_timeout).await {
        Ok(()) => {
            checks.insert(FORWARDER_CHECK, "OK".to_string());
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!(error = %e, "forward receiver unreachable");
            checks.insert(FORWARDER_CHECK, e.to_string());
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(checks))
}

/// `GET /health/live`
pub async fn live(State(state): State<AppState>) -> impl IntoResponse {
    check(&state).await
}

/// `GET /health/ready`
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    check(&state).await
}
