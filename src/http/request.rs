//! Inbound request headers of the delivery contract.
//!
//! # Design Decisions
//! - Header lookups are case-insensitive (HTTP semantics); attribute keys
//!   inside the common-attributes JSON are not
//! - The shared secret is compared in constant time

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

pub const ACCESS_KEY_HEADER: &str = "x-amz-firehose-access-key";
pub const REQUEST_ID_HEADER: &str = "x-amz-firehose-request-id";
pub const COMMON_ATTRIBUTES_HEADER: &str = "x-amz-firehose-common-attributes";

/// Non-empty, valid-ASCII header value.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// The request-id header, when present.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    header_str(headers, REQUEST_ID_HEADER).map(str::to_owned)
}

/// Whether the access-key header equals `expected`.
pub fn access_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    match headers.get(ACCESS_KEY_HEADER) {
        Some(value) if !value.is_empty() => value.as_bytes().ct_eq(expected.as_bytes()).into(),
        _ => false,
    }
}
