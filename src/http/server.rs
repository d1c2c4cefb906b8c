//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all proxy handlers
//! - Wire up middleware (tracing, timeouts, body limit, request ID)
//! - Bind server to listener
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BffConfig;
use crate::http::health::healthz;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::monitoring::{self, MonitoringSink};
use crate::proxy::{UpstreamClient, ENDPOINTS};
use crate::routing::proxy_routes;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub monitor: Arc<dyn MonitoringSink>,
}

/// HTTP server for the BFF.
pub struct HttpServer {
    router: Router,
    config: BffConfig,
}

impl HttpServer {
    /// Create a new HTTP server reporting to the process-wide monitoring sink.
    pub fn new(config: BffConfig) -> Result<Self, reqwest::Error> {
        Self::with_monitor(config, monitoring::sink())
    }

    /// Create a new HTTP server reporting to `monitor`.
    pub fn with_monitor(
        config: BffConfig,
        monitor: Arc<dyn MonitoringSink>,
    ) -> Result<Self, reqwest::Error> {
        let state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config)?),
            monitor,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BffConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .merge(proxy_routes(ENDPOINTS))
            .fallback(not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BffConfig {
        &self.config
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
