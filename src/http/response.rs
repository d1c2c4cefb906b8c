//! Relaying backend responses to the caller.
//!
//! # Design Decisions
//! - Backend status is passed through unchanged, including 4xx/5xx
//! - Only the content type (and, for downloads, content disposition) is
//!   copied; hop-by-hop and backend-internal headers stay behind
//! - Buffered relays default to `application/json`, streamed relays to
//!   `application/octet-stream`

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

pub const DEFAULT_TEXT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

fn content_type(headers: &HeaderMap, default: &'static str) -> HeaderValue {
    headers
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(default))
}

fn with_status(body: Body, status: StatusCode) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

/// A fully buffered backend body.
pub fn relay_buffered(status: StatusCode, upstream_headers: &HeaderMap, body: Bytes) -> Response {
    let mut response = with_status(Body::from(body), status);
    response.headers_mut().insert(
        CONTENT_TYPE,
        content_type(upstream_headers, DEFAULT_TEXT_CONTENT_TYPE),
    );
    response
}

/// A streamed backend body (exports and other downloads).
pub fn relay_stream(status: StatusCode, upstream_headers: &HeaderMap, body: Body) -> Response {
    let mut response = with_status(body, status);
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        content_type(upstream_headers, DEFAULT_STREAM_CONTENT_TYPE),
    );
    if let Some(disposition) = upstream_headers.get(CONTENT_DISPOSITION) {
        headers.insert(CONTENT_DISPOSITION, disposition.clone());
    }
    response
}
