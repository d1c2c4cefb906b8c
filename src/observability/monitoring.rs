//! Error monitoring.
//!
//! A [`MonitoringSink`] receives failures worth a human's attention. Without
//! a DSN the installed sink is [`NoopSink`]; with one it is [`SentrySink`].
//! Installation goes through a [`MonitoringSlot`], which is set at most once,
//! so calling [`init`] repeatedly is harmless.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::MonitoringConfig;

/// Destination for error reports.
pub trait MonitoringSink: Send + Sync + std::fmt::Debug {
    /// True if reports actually leave the process.
    fn is_enabled(&self) -> bool;

    /// Report an error. `context` is a short summary, `detail` the underlying cause.
    fn capture_error(&self, context: &str, detail: &str);

    /// Wait up to `timeout` for queued reports to be sent. Returns false on timeout.
    fn flush(&self, timeout: Duration) -> bool;
}

/// Sink used when monitoring is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MonitoringSink for NoopSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn capture_error(&self, _context: &str, _detail: &str) {}

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// Sentry-backed sink. Holds the client guard for the life of the process.
pub struct SentrySink {
    guard: sentry::ClientInitGuard,
}

impl std::fmt::Debug for SentrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentrySink")
            .field("enabled", &self.guard.is_enabled())
            .finish()
    }
}

impl SentrySink {
    pub fn init(config: &MonitoringConfig, dsn: &str) -> Result<Self, sentry::types::ParseDsnError> {
        let dsn: sentry::types::Dsn = dsn.trim().parse()?;
        let guard = sentry::init(sentry::ClientOptions {
            dsn: Some(dsn),
            environment: Some(config.environment.clone().into()),
            release: config.release.clone().map(Into::into),
            traces_sample_rate: config.traces_sample_rate,
            ..Default::default()
        });

        sentry::configure_scope(|scope| {
            scope.set_tag("service", "bff");
        });

        Ok(Self { guard })
    }
}

impl MonitoringSink for SentrySink {
    fn is_enabled(&self) -> bool {
        self.guard.is_enabled()
    }

    fn capture_error(&self, context: &str, detail: &str) {
        sentry::with_scope(
            |scope| scope.set_extra("detail", detail.into()),
            || sentry::capture_message(context, sentry::Level::Error),
        );
    }

    fn flush(&self, timeout: Duration) -> bool {
        sentry::Hub::current()
            .client()
            .map(|client| client.flush(Some(timeout)))
            .unwrap_or(true)
    }
}

/// Pick a sink for `config`. Never fails; a bad DSN degrades to [`NoopSink`].
pub fn build_sink(config: &MonitoringConfig) -> Arc<dyn MonitoringSink> {
    let Some(dsn) = config.dsn.as_deref().filter(|d| !d.trim().is_empty()) else {
        tracing::info!("Error monitoring not configured, skipping initialization");
        return Arc::new(NoopSink);
    };

    match SentrySink::init(config, dsn) {
        Ok(sink) => {
            tracing::info!(environment = %config.environment, "Error monitoring initialized");
            Arc::new(sink)
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid monitoring DSN, error reports disabled");
            Arc::new(NoopSink)
        }
    }
}

/// One-shot holder for the installed sink.
#[derive(Debug, Default)]
pub struct MonitoringSlot {
    sink: OnceLock<Arc<dyn MonitoringSink>>,
}

impl MonitoringSlot {
    pub const fn new() -> Self {
        Self {
            sink: OnceLock::new(),
        }
    }

    /// Install a sink for `config` unless one is already installed, and return
    /// whichever sink is in place afterwards.
    pub fn init(&self, config: &MonitoringConfig) -> Arc<dyn MonitoringSink> {
        self.sink.get_or_init(|| build_sink(config)).clone()
    }

    /// The installed sink, or a no-op sink if nothing was installed.
    pub fn get(&self) -> Arc<dyn MonitoringSink> {
        match self.sink.get() {
            Some(sink) => sink.clone(),
            None => Arc::new(NoopSink),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.sink.get().is_some()
    }

    /// Flush the installed sink, if any.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.sink.get().map_or(true, |sink| sink.flush(timeout))
    }
}

static GLOBAL: MonitoringSlot = MonitoringSlot::new();

/// Initialize process-wide monitoring. Later calls return the first sink.
pub fn init(config: &MonitoringConfig) -> Arc<dyn MonitoringSink> {
    GLOBAL.init(config)
}

/// The process-wide sink.
pub fn sink() -> Arc<dyn MonitoringSink> {
    GLOBAL.get()
}

/// Flush pending reports before exit.
pub fn shutdown(timeout: Duration) {
    if !GLOBAL.flush(timeout) {
        tracing::warn!(timeout = ?timeout, "Timed out flushing error reports");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_without_dsn() {
        let slot = MonitoringSlot::new();
        assert!(!slot.is_initialized());
        let sink = slot.init(&MonitoringConfig::default());
        assert!(!sink.is_enabled());
        assert!(slot.is_initialized());
        assert!(sink.flush(Duration::from_millis(1)));
    }

    #[test]
    fn test_invalid_dsn_degrades_to_noop() {
        let config = MonitoringConfig {
            dsn: Some("definitely not a dsn".into()),
            ..Default::default()
        };
        assert!(!build_sink(&config).is_enabled());
    }

    #[test]
    fn test_blank_dsn_is_unset() {
        let config = MonitoringConfig {
            dsn: Some("   ".into()),
            ..Default::default()
        };
        assert!(!build_sink(&config).is_enabled());
    }

    #[test]
    fn test_init_is_idempotent() {
        let slot = MonitoringSlot::new();
        let first = slot.init(&MonitoringConfig::default());
        let second = slot.init(&MonitoringConfig {
            dsn: Some("https://public@o0.ingest.sentry.io/42".into()),
            ..Default::default()
        });
        assert!(std::ptr::addr_eq(Arc::as_ptr(&first), Arc::as_ptr(&second)));
        assert!(!second.is_enabled());
    }

    #[test]
    fn test_uninitialized_slot_hands_out_noop() {
        let slot = MonitoringSlot::new();
        assert!(!slot.get().is_enabled());
        assert!(!slot.is_initialized());
        assert!(slot.flush(Duration::from_millis(1)));
    }
}
