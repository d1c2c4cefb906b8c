//! Proxy handlers.
//!
//! # Data Flow
//! ```text
//! Inbound request on /api/...
//!     → endpoints.rs (which backend path, body mode, response mode)
//!     → forward.rs (validate params and body, copy Authorization)
//!     → client.rs (build one outbound attempt)
//!     → resilience::retries (repeat attempts per policy)
//!     → http::response (relay status, body, content type)
//! ```
//!
//! # Design Decisions
//! - One generic handler; endpoints differ only by their table entry
//! - Malformed inbound requests never reach the executor
//! - Transport failures become a uniform 500 envelope

pub mod client;
pub mod endpoints;
pub mod error;
pub mod forward;

pub use client::UpstreamClient;
pub use endpoints::{Endpoint, ENDPOINTS};
pub use error::ProxyError;
