//! The generic proxy handler.
//!
//! Every entry of the endpoint table is served by [`forward`]: validate the
//! inbound request, build a producer for the backend call, run it through
//! the retry executor, relay whatever comes back.

use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::request;
use crate::http::response::{relay_buffered, relay_stream};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::endpoints::{BodyMode, Endpoint, ResponseMode};
use crate::proxy::client::Forwarded;
use crate::proxy::error::{ProxyError, UPSTREAM_FAILURE};
use crate::resilience::{retries, RetryPolicy};
use crate::routing::matcher::PathTemplate;

/// An endpoint with its templates parsed once at startup.
#[derive(Debug)]
pub struct CompiledEndpoint {
    pub endpoint: &'static Endpoint,
    pub route: PathTemplate,
    pub upstream: PathTemplate,
}

impl CompiledEndpoint {
    pub fn new(endpoint: &'static Endpoint) -> Self {
        Self {
            endpoint,
            route: PathTemplate::parse(endpoint.route),
            upstream: PathTemplate::parse(endpoint.upstream),
        }
    }
}

/// Serve one proxied request.
pub async fn forward(
    state: AppState,
    compiled: Arc<CompiledEndpoint>,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let endpoint = compiled.endpoint;
    let request_id = request::request_id(&headers)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        endpoint = endpoint.name,
        method = endpoint.method.as_str(),
        path = %uri.path(),
        "Proxying request"
    );

    let response = match proxy(&state, &compiled, &uri, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::Upstream(cause) => {
                    tracing::error!(
                        request_id = %request_id,
                        endpoint = endpoint.name,
                        error = %cause,
                        "Upstream request failed"
                    );
                    metrics::record_upstream_failure(endpoint.name);
                    state.monitor.capture_error(
                        &format!("{} ({})", UPSTREAM_FAILURE, endpoint.name),
                        &cause.to_string(),
                    );
                }
                other => {
                    tracing::warn!(
                        request_id = %request_id,
                        endpoint = endpoint.name,
                        error = %other,
                        "Rejected request"
                    );
                }
            }
            e.into_response()
        }
    };

    metrics::record_request(
        endpoint.name,
        endpoint.method.as_str(),
        response.status().as_u16(),
        start,
    );
    response
}

async fn proxy(
    state: &AppState,
    compiled: &CompiledEndpoint,
    uri: &Uri,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    let endpoint = compiled.endpoint;

    let params = compiled.route.captures(uri.path()).unwrap_or_default();
    for name in compiled.route.param_names() {
        let present = params
            .iter()
            .any(|(n, v)| n == name && !v.trim().is_empty());
        if !present {
            return Err(ProxyError::MissingParameter(name.to_string()));
        }
    }

    let json_body = match endpoint.body {
        BodyMode::Json => {
            let bytes = body?;
            serde_json::from_slice::<serde_json::Value>(&bytes)?;
            Some(bytes)
        }
        BodyMode::Empty => None,
    };

    let upstream = &state.upstream;
    let query = if endpoint.forward_query { uri.query() } else { None };
    let url = upstream.url_for(&compiled.upstream.render(&params), query);
    let forwarded = Forwarded {
        authorization: headers.get(AUTHORIZATION).cloned(),
        request_id: request::request_id(headers).cloned(),
        json_body,
        bounded: endpoint.response == ResponseMode::Text,
    };
    let policy = if endpoint.idempotent {
        upstream.retry_policy().clone()
    } else {
        RetryPolicy::none()
    };

    let method = endpoint.method.as_method();
    let mut attempt: u32 = 0;
    let response = retries::execute(&policy, || {
        if attempt > 0 {
            metrics::record_retry(endpoint.name);
        }
        attempt += 1;
        upstream.request(method.clone(), &url, &forwarded).send()
    })
    .await?;

    let status = response.status();
    tracing::debug!(
        endpoint = endpoint.name,
        status = status.as_u16(),
        attempts = attempt,
        "Upstream responded"
    );

    match endpoint.response {
        ResponseMode::Text => {
            let upstream_headers = response.headers().clone();
            let bytes = response.bytes().await?;
            Ok(relay_buffered(status, &upstream_headers, bytes))
        }
        ResponseMode::Stream => {
            let upstream_headers = response.headers().clone();
            let body = Body::from_stream(response.bytes_stream());
            Ok(relay_stream(status, &upstream_headers, body))
        }
    }
}
