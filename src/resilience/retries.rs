//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether an upstream response is worth another attempt
//! - Re-invoke a request producer a bounded number of times
//! - Hand back the first acceptable response, or the last outcome
//!
//! # Design Decisions
//! - The executor takes a producer, not a built request, so every attempt
//!   sends a fresh request (bodies are consumed by the transport)
//! - Only the configured status set is retried (default: 500)
//! - Constant delay between attempts, none after the last one
//! - Exhausting retries on a retryable status returns that response;
//!   exhausting retries on transport errors returns the last error

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;

/// Anything that carries an HTTP status code.
pub trait StatusCarrier {
    fn status_code(&self) -> u16;
}

impl StatusCarrier for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl<B> StatusCarrier for axum::http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Immutable retry policy for one executor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Statuses that trigger another attempt.
    pub retryable_status_codes: BTreeSet<u16>,
}

impl RetryPolicy {
    /// A single attempt, no retries. Used for requests that are unsafe to repeat.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    /// Returns true if a response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Upper bound on producer invocations.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::ZERO,
            retryable_status_codes: BTreeSet::from([500]),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            retryable_status_codes: config.retryable_status_codes.iter().copied().collect(),
        }
    }
}

/// Run `produce` until it yields a non-retryable response or the policy is exhausted.
///
/// The producer is called at most `policy.max_attempts()` times. A transport
/// error on the final attempt is returned as-is; a retryable status on the
/// final attempt is returned as a normal response.
pub async fn execute<F, Fut, R, E>(policy: &RetryPolicy, mut produce: F) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: StatusCarrier,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        let is_last = attempt >= policy.max_retries;
        match produce().await {
            Ok(response) => {
                let status = response.status_code();
                if is_last || !policy.is_retryable_status(status) {
                    return Ok(response);
                }
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    status,
                    "Retryable upstream status, retrying"
                );
            }
            Err(e) => {
                if is_last {
                    return Err(e);
                }
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    error = %e,
                    "Upstream transport error, retrying"
                );
            }
        }

        if !policy.retry_delay.is_zero() {
            tokio::time::sleep(policy.retry_delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Reply(u16);

    impl StatusCarrier for Reply {
        fn status_code(&self) -> u16 {
            self.0
        }
    }

    #[derive(Debug, PartialEq)]
    struct Refused(u32);

    impl std::fmt::Display for Refused {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "connection refused (attempt {})", self.0)
        }
    }

    /// Producer that answers with `script[n]` on call `n`, repeating the last entry.
    fn scripted(
        script: Vec<Result<u16, ()>>,
    ) -> (Arc<AtomicU32>, impl FnMut() -> std::future::Ready<Result<Reply, Refused>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let produce = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let idx = (n as usize).min(script.len() - 1);
            let outcome = match script[idx] {
                Ok(status) => Ok(Reply(status)),
                Err(()) => Err(Refused(n + 1)),
            };
            std::future::ready(outcome)
        };
        (calls, produce)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.retry_delay, Duration::ZERO);
        assert!(policy.is_retryable_status(500));
        assert!(!policy.is_retryable_status(502));
        assert!(!policy.is_retryable_status(404));
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_retries: 4,
            retry_delay_ms: 250,
            retryable_status_codes: vec![429, 503],
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.retry_delay, Duration::from_millis(250));
        assert!(policy.is_retryable_status(429));
        assert!(!policy.is_retryable_status(500));
    }

    #[tokio::test]
    async fn test_recovers_after_server_errors() {
        let (calls, produce) = scripted(vec![Ok(500), Ok(500), Ok(200)]);
        let result = execute(&RetryPolicy::default(), produce).await;
        assert_eq!(result, Ok(Reply(200)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_status_returns_immediately() {
        let (calls, produce) = scripted(vec![Ok(503)]);
        let policy = RetryPolicy::default().with_max_retries(1);
        let result = execute(&policy, produce).await;
        assert_eq!(result, Ok(Reply(503)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_errors_are_never_retried() {
        for status in [400, 401, 403, 404, 422] {
            let (calls, produce) = scripted(vec![Ok(status)]);
            let policy = RetryPolicy::default().with_max_retries(5);
            assert_eq!(execute(&policy, produce).await, Ok(Reply(status)));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_zero_retries_reraises_first_error() {
        let (calls, produce) = scripted(vec![Err(())]);
        let result = execute(&RetryPolicy::none(), produce).await;
        assert_eq!(result, Err(Refused(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_status_set() {
        let (calls, produce) = scripted(vec![Ok(429), Ok(429), Ok(200)]);
        let policy = RetryPolicy::default()
            .with_max_retries(2)
            .with_retryable_status_codes([429, 500]);
        let result = execute(&policy, produce).await;
        assert_eq!(result, Ok(Reply(200)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_bounded_for_every_retry_count() {
        for n in 0..6 {
            let (calls, produce) = scripted(vec![Ok(500)]);
            let policy = RetryPolicy::default().with_max_retries(n);
            let _ = execute(&policy, produce).await;
            assert_eq!(calls.load(Ordering::SeqCst), n + 1);

            let (calls, produce) = scripted(vec![Err(())]);
            let _ = execute(&policy, produce).await;
            assert_eq!(calls.load(Ordering::SeqCst), n + 1);

            let (calls, produce) = scripted(vec![Ok(200)]);
            let _ = execute(&policy, produce).await;
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_transport_error_then_success() {
        let (calls, produce) = scripted(vec![Err(()), Ok(201)]);
        let result = execute(&RetryPolicy::default(), produce).await;
        assert_eq!(result, Ok(Reply(201)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Exhaustion is asymmetric: a retryable status comes back as a response,
    /// while repeated transport errors come back as the last error.
    #[tokio::test]
    async fn test_exhaustion_asymmetry() {
        let (_, produce) = scripted(vec![Ok(500)]);
        assert_eq!(execute(&RetryPolicy::default(), produce).await, Ok(Reply(500)));

        let (_, produce) = scripted(vec![Err(())]);
        assert_eq!(execute(&RetryPolicy::default(), produce).await, Err(Refused(3)));
    }

    #[tokio::test]
    async fn test_last_error_wins_when_all_attempts_fail() {
        let (calls, produce) = scripted(vec![Err(()), Err(()), Err(()), Err(())]);
        let policy = RetryPolicy::default().with_max_retries(3);
        assert_eq!(execute(&policy, produce).await, Err(Refused(4)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts_only() {
        let (_, produce) = scripted(vec![Ok(500)]);
        let policy = RetryPolicy::default().with_retry_delay(Duration::from_millis(100));
        let start = tokio::time::Instant::now();
        let _ = execute(&policy, produce).await;
        // Three attempts, two pauses.
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_on_first_success() {
        let (_, produce) = scripted(vec![Ok(200)]);
        let policy = RetryPolicy::default().with_retry_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        let _ = execute(&policy, produce).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
