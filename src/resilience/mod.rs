//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler builds a request producer
//!     → retries.rs (invoke producer, retry on transport error / retryable status)
//!     → first acceptable response, or last outcome after exhaustion
//! ```
//!
//! # Design Decisions
//! - Connect and upstream timeouts live on the HTTP client, not here
//! - Non-idempotent endpoints run with a zero-retry policy
//! - Constant delay; no jitter, no circuit breaking

pub mod retries;

pub use retries::{execute, RetryPolicy, StatusCarrier};
