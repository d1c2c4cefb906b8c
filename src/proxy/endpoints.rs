//! The fixed table of proxied backend endpoints.

use axum::http::Method;
use axum::routing::MethodFilter;

/// Inbound method of a proxy handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_method(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    pub fn as_filter(self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Delete => MethodFilter::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// What the handler sends upstream as a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// No body is forwarded.
    Empty,
    /// The inbound body must be JSON and is forwarded as `application/json`.
    Json,
}

/// How the backend's response body is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Buffered; content type defaults to `application/json`.
    Text,
    /// Streamed; content type defaults to `application/octet-stream`.
    Stream,
}

/// A single proxy handler: one inbound method+path forwarded to one backend path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Name used in logs and metrics.
    pub name: &'static str,
    pub method: HttpMethod,
    /// Inbound path template, e.g. `/api/patent/{pub_id}`.
    pub route: &'static str,
    /// Backend path template, appended to the configured base URL.
    pub upstream: &'static str,
    pub body: BodyMode,
    /// Append the inbound query string to the backend URL.
    pub forward_query: bool,
    pub response: ResponseMode,
    /// Safe to repeat. Non-idempotent endpoints are attempted exactly once.
    pub idempotent: bool,
}

const fn get(name: &'static str, route: &'static str, upstream: &'static str) -> Endpoint {
    Endpoint {
        name,
        method: HttpMethod::Get,
        route,
        upstream,
        body: BodyMode::Empty,
        forward_query: false,
        response: ResponseMode::Text,
        idempotent: true,
    }
}

const fn post(name: &'static str, route: &'static str, upstream: &'static str, idempotent: bool) -> Endpoint {
    Endpoint {
        name,
        method: HttpMethod::Post,
        route,
        upstream,
        body: BodyMode::Json,
        forward_query: false,
        response: ResponseMode::Text,
        idempotent,
    }
}

const fn delete(name: &'static str, route: &'static str, upstream: &'static str) -> Endpoint {
    Endpoint {
        name,
        method: HttpMethod::Delete,
        route,
        upstream,
        body: BodyMode::Empty,
        forward_query: false,
        response: ResponseMode::Text,
        idempotent: true,
    }
}

const fn with_query(mut endpoint: Endpoint) -> Endpoint {
    endpoint.forward_query = true;
    endpoint
}

const fn streamed(mut endpoint: Endpoint) -> Endpoint {
    endpoint.response = ResponseMode::Stream;
    endpoint
}

pub const ENDPOINTS: &[Endpoint] = &[
    // Search and analytics
    post("search", "/api/search", "/search", true),
    with_query(get("trend_volume", "/api/trend/volume", "/trend/volume")),
    get("patent_detail", "/api/patent/{pub_id}", "/patent/{pub_id}"),
    streamed(with_query(get("export", "/api/export", "/export"))),
    post("overview_graph", "/api/whitespace/graph", "/whitespace/graph", true),
    // Saved queries / alerts
    get("saved_queries_list", "/api/saved-queries", "/saved-queries"),
    post("saved_queries_create", "/api/saved-queries", "/saved-queries", false),
    delete("saved_queries_delete", "/api/saved-queries/{id}", "/saved-queries/{id}"),
    // Billing
    get("pricing_plans", "/api/payment/pricing-plans", "/api/payment/pricing-plans"),
    get(
        "subscription_status",
        "/api/payment/subscription-status",
        "/api/payment/subscription-status",
    ),
    post(
        "create_checkout_session",
        "/api/payment/create-checkout-session",
        "/api/payment/create-checkout-session",
        false,
    ),
    post(
        "create_portal_session",
        "/api/payment/create-portal-session",
        "/api/payment/create-portal-session",
        false,
    ),
    post(
        "cancel_subscription",
        "/api/payment/cancel-subscription",
        "/api/payment/cancel-subscription",
        false,
    ),
    post(
        "reactivate_subscription",
        "/api/payment/reactivate-subscription",
        "/api/payment/reactivate-subscription",
        false,
    ),
];
