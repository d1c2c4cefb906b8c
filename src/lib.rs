//! Patent Scout backend-for-frontend.
//!
//! Thin proxy handlers forward authenticated requests from the web app to the
//! Patent Scout backend, retrying transient failures and relaying responses
//! unchanged.
//!
//! ```text
//!   Browser ──▶ /api/... ──▶ proxy handler ──▶ retry executor ──▶ Backend
//!                                 │                                 │
//!   Browser ◀── status/body ◀─────┴──────── relay ◀─────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;

pub use config::BffConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{execute, RetryPolicy};
