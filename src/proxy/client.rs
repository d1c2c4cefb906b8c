//! Outbound HTTP client for the backend service.

use std::time::Duration;

use axum::http::header::{HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::Method;

use crate::config::BffConfig;
use crate::http::request::X_REQUEST_ID;
use crate::resilience::RetryPolicy;

/// Everything a proxy handler needs to reach the backend.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
    timeout: Duration,
}

/// Per-request inputs copied from the inbound request.
#[derive(Debug, Clone, Default)]
pub struct Forwarded {
    pub authorization: Option<HeaderValue>,
    pub request_id: Option<HeaderValue>,
    pub json_body: Option<axum::body::Bytes>,
    /// Apply the buffered-call timeout. Streaming calls run unbounded once headers arrive.
    pub bounded: bool,
}

impl UpstreamClient {
    pub fn new(config: &BffConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .user_agent(concat!("patent-scout-bff/", env!("CARGO_PKG_VERSION")));
        if !config.upstream.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::from(&config.retries),
            timeout: Duration::from_secs(config.timeouts.upstream_secs),
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// `<base_url><path>[?query]`. Empty queries are dropped.
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}{}?{}", self.base_url, path, q),
            None => format!("{}{}", self.base_url, path),
        }
    }

    /// Build one outbound attempt. Called once per retry, so nothing here may consume input.
    pub fn request(&self, method: Method, url: &str, forwarded: &Forwarded) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        if let Some(auth) = &forwarded.authorization {
            builder = builder.header(AUTHORIZATION, auth.clone());
        }
        if let Some(id) = &forwarded.request_id {
            builder = builder.header(X_REQUEST_ID, id.clone());
        }
        if let Some(body) = &forwarded.json_body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.clone());
        }
        if forwarded.bounded {
            builder = builder.timeout(self.timeout);
        }
        builder
    }
}
