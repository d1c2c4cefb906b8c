//! Errors a proxy handler can answer with instead of a backend response.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const UPSTREAM_FAILURE: &str = "Failed to reach backend";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// A required path parameter is absent or blank.
    #[error("Missing {0}")]
    MissingParameter(String),

    /// The inbound body could not be read (too large, client went away).
    #[error("Failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    /// The inbound body is not JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No response could be obtained from the backend.
    #[error("Failed to reach backend: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingParameter(_) | ProxyError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ProxyError::Body(rejection) => rejection.status(),
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::MissingParameter(name) => json!({ "error": format!("Missing {name}") }),
            ProxyError::Body(rejection) => json!({
                "error": "Invalid request body",
                "detail": rejection.body_text(),
            }),
            ProxyError::InvalidJson(e) => json!({
                "error": "Invalid JSON body",
                "detail": e.to_string(),
            }),
            ProxyError::Upstream(e) => json!({
                "error": UPSTREAM_FAILURE,
                "detail": e.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_parameter_envelope() {
        let response = ProxyError::MissingParameter("pub_id".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Missing pub_id" }));
    }

    #[tokio::test]
    async fn test_invalid_json_envelope() {
        let err = serde_json::from_slice::<serde_json::Value>(b"{nope").unwrap_err();
        let response = ProxyError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid JSON body");
        assert!(body["detail"].as_str().unwrap().contains("key must be a string"));
    }
}
