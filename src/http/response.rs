//! Response envelopes and the API error taxonomy.
//!
//! # Design Decisions
//! - Exactly three caller-visible failures: 401, 400 and a generic 500
//! - Every response, success or failure, is the same JSON envelope
//! - Error messages are fixed strings; internal details never leak

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::firehose::ResponseBody;
use crate::observability::metrics;

/// Errors a delivery caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request")]
    BadRequest,

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the caller's request ID so the envelope can echo it.
    pub fn for_request(self, request_id: Option<String>) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self,
            request_id,
        }
    }
}

/// An [`ApiError`] bound to the request it answers.
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        tracing::debug!(
            request_id = ?self.request_id,
            error = %self.error,
            "delivery error response"
        );
        let body = ResponseBody::error(self.request_id, self.error.to_string());
        (self.error.status(), Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.for_request(None).into_response()
    }
}

/// Panic handler for `CatchPanicLayer`: a generic 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "request handler panicked");
    metrics::record_request(ApiError::Internal.status().as_u16());
    ApiError::Internal.into_response()
}
