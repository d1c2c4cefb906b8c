//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!     → monitoring.rs (error reports to Sentry, or nowhere)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Error monitoring (only when a DSN is configured)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound request to the backend call
//! - Metrics are cheap and no-op until an exporter is installed
//! - Monitoring is a trait object; callers never branch on whether it is configured

pub mod logging;
pub mod metrics;
pub mod monitoring;
