//! Delivery and metrics handlers.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::request::{self, COMMON_ATTRIBUTES_HEADER};
use super::response::{ApiError, ApiErrorResponse};
use super::server::AppState;
use crate::firehose::{classify, process_batch, DeliveryBatch, ResponseBody};
use crate::observability::metrics;

/// `POST /`: authenticate, parse, classify and forward one delivery batch.
///
/// The acknowledgement never reflects per-record forwarding outcomes; once
/// the batch parses the answer is 200.
pub async fn deliver(State(state): State<AppState>, request: Request<Body>) -> Response {
    let response = match handle_delivery(&state, request).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => e.into_response(),
    };
    metrics::record_request(response.status().as_u16());
    response
}

async fn handle_delivery(
    state: &AppState,
    request: Request<Body>,
) -> Result<Json<ResponseBody>, ApiErrorResponse> {
    let (parts, body) = request.into_parts();
    let request_id = request::request_id(&parts.headers);

    if !request::access_key_matches(&parts.headers, &state.firehose.access_key) {
        tracing::warn!(request_id = ?request_id, "access key missing or invalid");
        return Err(ApiError::Unauthorized.for_request(request_id));
    }

    let Some(request_id) = request_id else {
        tracing::warn!("request id header missing");
        return Err(ApiError::BadRequest.for_request(None));
    };

    if parts.method != Method::POST {
        tracing::warn!(request_id = %request_id, method = %parts.method, "unsupported method");
        return Err(ApiError::BadRequest.for_request(Some(request_id)));
    }

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => {
            tracing::warn!(request_id = %request_id, "empty request body");
            return Err(ApiError::BadRequest.for_request(Some(request_id)));
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "failed to read request body");
            return Err(ApiError::BadRequest.for_request(Some(request_id)));
        }
    };

    let batch: DeliveryBatch = match serde_json::from_slice(&bytes) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "malformed delivery body");
            return Err(ApiError::BadRequest.for_request(Some(request_id)));
        }
    };

    if !batch.request_id.is_empty() && batch.request_id != request_id {
        tracing::debug!(
            request_id = %request_id,
            body_request_id = %batch.request_id,
            "body request id differs from header"
        );
    }

    let event_type = classify(
        parts.headers.get(COMMON_ATTRIBUTES_HEADER).map(HeaderValue::as_bytes),
        &state.firehose.event_type_header_name,
    );

    let report = process_batch(&batch, event_type, &request_id, &state.forwarder).await;

    tracing::info!(
        request_id = %request_id,
        event_type = %event_type,
        records = batch.records.len(),
        sent = report.sent(),
        failed = report.failed(),
        skipped = report.skipped(),
        "delivery processed"
    );

    Ok(Json(ResponseBody::accepted(request_id)))
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request as HttpRequest;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::firehose::decode::test_support::*;
    use crate::forward::testing::RecordingForwarder;
    use crate::forward::{ForwardAdapter, Forwarder};
    use crate::http::request::{ACCESS_KEY_HEADER, REQUEST_ID_HEADER};
    use crate::http::server::build_router;

    const KEY: &str = "secret";

    fn app(recorder: Arc<RecordingForwarder>) -> axum::Router {
        let mut config = GatewayConfig::default();
        config.firehose.access_key = KEY.into();
        let forwarder: Arc<dyn Forwarder> = recorder;
        let state = AppState::new(
            &config,
            ForwardAdapter::new(forwarder),
            metrics::init_metrics(),
        );
        build_router(state)
    }

    fn delivery(event_type: Option<&str>, body: String) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .header(ACCESS_KEY_HEADER, KEY)
            .header(REQUEST_ID_HEADER, "r1");
        if let Some(event_type) = event_type {
            builder = builder.header(
                COMMON_ATTRIBUTES_HEADER,
                json!({ "commonAttributes": { "X-EVENT-TYPE": event_type } }).to_string(),
            );
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn batch_body(records: Vec<crate::firehose::RawRecord>) -> String {
        json!({
            "requestId": "r1",
            "timestamp": 1_700_000_000_000i64,
            "records": records,
        })
        .to_string()
    }

    async fn read(response: Response) -> (StatusCode, ResponseBody) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn cloudfront_line_is_forwarded_and_acknowledged() {
        let recorder = Arc::new(RecordingForwarder::default());
        let body = batch_body(vec![cloudfront_record("hello")]);

        let response = app(recorder.clone())
            .oneshot(delivery(Some("cloudfront"), body))
            .await
            .unwrap();
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.request_id, "r1");
        assert!(body.timestamp > 0);
        assert_eq!(body.error_message, None);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].tag, "cloudfront");
        assert_eq!(messages[0].record["data"], "hello");
    }

    #[tokio::test]
    async fn cloudwatch_events_expand_in_order() {
        let recorder = Arc::new(RecordingForwarder::default());
        let envelope = cloudwatch_envelope(&[("first", 1_000), ("second", 2_000)]);
        let body = batch_body(vec![gzip_record(&envelope)]);

        let response = app(recorder.clone())
            .oneshot(delivery(Some("cloudwatchlogs"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let messages = recorder.messages();
        let lines: Vec<_> = messages.iter().map(|m| m.record["message"].clone()).collect();
        assert_eq!(lines, vec![json!("first"), json!("second")]);
        assert!(messages.iter().all(|m| m.record["requestID"] == "r1"));
    }

    #[tokio::test]
    async fn non_ascii_common_attributes_still_classify() {
        let recorder = Arc::new(RecordingForwarder::default());
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .header(ACCESS_KEY_HEADER, KEY)
            .header(REQUEST_ID_HEADER, "r1")
            .header(
                COMMON_ATTRIBUTES_HEADER,
                json!({ "commonAttributes": { "team": "équipe", "X-EVENT-TYPE": "cloudfront" } })
                    .to_string(),
            )
            .body(Body::from(batch_body(vec![cloudfront_record("accented")])))
            .unwrap();

        let response = app(recorder.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].record["data"], "accented");
    }

    #[tokio::test]
    async fn unknown_event_type_still_succeeds() {
        let recorder = Arc::new(RecordingForwarder::default());
        let body = batch_body(vec![cloudfront_record("hello")]);

        let response = app(recorder.clone())
            .oneshot(delivery(None, body))
            .await
            .unwrap();
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.request_id, "r1");
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn forward_failures_do_not_change_the_response() {
        let recorder = Arc::new(RecordingForwarder::failing_on([0]));
        let body = batch_body(vec![cloudfront_record("a"), cloudfront_record("b")]);

        let response = app(recorder.clone())
            .oneshot(delivery(Some("cloudfront"), body))
            .await
            .unwrap();
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.error_message, None);
        assert_eq!(recorder.attempts(), 2);
        assert_eq!(recorder.messages()[0].record["data"], "b");
    }

    #[tokio::test]
    async fn bad_records_are_skipped() {
        let recorder = Arc::new(RecordingForwarder::default());
        let body = batch_body(vec![
            crate::firehose::RawRecord { data: "%%%".into() },
            cloudfront_record("ok"),
        ]);

        let response = app(recorder.clone())
            .oneshot(delivery(Some("cloudfront"), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(recorder.messages().len(), 1);
    }

    #[tokio::test]
    async fn missing_or_wrong_key_is_unauthorized() {
        for key in [None, Some("wrong")] {
            let recorder = Arc::new(RecordingForwarder::default());
            let mut builder = HttpRequest::builder()
                .method(Method::POST)
                .uri("/")
                .header(REQUEST_ID_HEADER, "r1");
            if let Some(key) = key {
                builder = builder.header(ACCESS_KEY_HEADER, key);
            }
            let request = builder
                .body(Body::from(batch_body(vec![cloudfront_record("x")])))
                .unwrap();

            let response = app(recorder.clone()).oneshot(request).await.unwrap();
            let (status, body) = read(response).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body.error_message.as_deref(), Some("unauthorized"));
            assert_eq!(body.request_id, "r1");
            assert_eq!(recorder.attempts(), 0);
        }
    }

    #[tokio::test]
    async fn missing_request_id_is_bad_request() {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .header(ACCESS_KEY_HEADER, KEY)
            .body(Body::from(batch_body(vec![])))
            .unwrap();

        let response = app(Arc::default()).oneshot(request).await.unwrap();
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_message.as_deref(), Some("bad request"));
        assert!(body.request_id.is_empty());
    }

    #[tokio::test]
    async fn non_post_is_bad_request() {
        let request = HttpRequest::builder()
            .method(Method::GET)
            .uri("/")
            .header(ACCESS_KEY_HEADER, KEY)
            .header(REQUEST_ID_HEADER, "r1")
            .body(Body::empty())
            .unwrap();

        let response = app(Arc::default()).oneshot(request).await.unwrap();
        let (status, body) = read(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.request_id, "r1");
    }

    #[tokio::test]
    async fn empty_or_malformed_body_is_bad_request() {
        for body in ["", "{not json", "[1,2]", r#"{"records": 5}"#] {
            let recorder = Arc::new(RecordingForwarder::default());
            let response = app(recorder.clone())
                .oneshot(delivery(Some("cloudfront"), body.to_string()))
                .await
                .unwrap();
            let (status, response_body) = read(response).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(response_body.error_message.as_deref(), Some("bad request"));
            assert_eq!(response_body.request_id, "r1");
            assert_eq!(recorder.attempts(), 0);
        }
    }

    #[tokio::test]
    async fn empty_object_is_an_empty_batch() {
        for body in ["{}", r#"{"requestId": null, "records": null}"#] {
            let response = app(Arc::default())
                .oneshot(delivery(Some("cloudfront"), body.to_string()))
                .await
                .unwrap();
            let (status, response_body) = read(response).await;
            assert_eq!(status, StatusCode::OK, "body {body:?}");
            assert_eq!(response_body.request_id, "r1");
        }
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_counters() {
        let recorder = Arc::new(RecordingForwarder::default());
        let router = app(recorder);
        router
            .clone()
            .oneshot(delivery(Some("cloudfront"), batch_body(vec![cloudfront_record("m")])))
            .await
            .unwrap();

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(
            to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec(),
        )
        .unwrap();
        assert!(text.contains(metrics::EVENTS_TOTAL));
        assert!(text.contains(metrics::REQUESTS_TOTAL));
    }
}
