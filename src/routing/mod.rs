//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     ENDPOINTS
//!     → matcher.rs (parse inbound and backend path templates)
//!     → router.rs (one axum route per path, methods merged)
//!     → parent paths of parameterised routes answer 400
//!
//! Incoming Request (method, path)
//!     → axum dispatch to the endpoint's handler
//!     → unknown paths → 404, known path with wrong method → 405
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use matcher::PathTemplate;
pub use router::proxy_routes;
