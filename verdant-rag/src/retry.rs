//! Timeout and retry wrapper for calls to external services.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{RagError, Result};

/// Runs an operation under a per-attempt deadline, retrying retryable
/// failures with exponential backoff.
///
/// Errors for which [`RagError::is_retryable`] is false are returned as-is on
/// the first occurrence. Once `max_attempts` is spent, the last failure is
/// reported as [`RagError::UpstreamUnavailable`].
#[derive(Debug, Clone, Default)]
pub struct Retrier {
    config: RetryConfig,
}

impl Retrier {
    /// Create a retrier for the given policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The policy in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently, or the budget is spent.
    ///
    /// `service` names the call in logs and in the exhaustion error.
    pub async fn run<T, F, Fut>(&self, service: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let message = match tokio::time::timeout(self.config.timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_retryable() => return Err(e),
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}ms", self.config.timeout.as_millis()),
            };

            if attempt >= max_attempts {
                return Err(RagError::UpstreamUnavailable {
                    service: service.to_string(),
                    attempts: attempt,
                    message,
                });
            }

            warn!(
                service,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %message,
                "external call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            backoff = next_backoff(backoff, self.config.max_backoff);
        }
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn transient() -> RagError {
        RagError::EmbeddingError {
            provider: "test".into(),
            message: "503 Service Unavailable".into(),
            retryable: true,
        }
    }

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let cap = Duration::from_millis(250);
        assert_eq!(next_backoff(Duration::from_millis(100), cap), Duration::from_millis(200));
        assert_eq!(next_backoff(Duration::from_millis(200), cap), cap);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let value = Retrier::new(policy(3))
            .run("embed", || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 { Err(transient()) } else { Ok(7) }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_upstream_unavailable() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = Retrier::new(policy(2))
            .run("complete", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(transient())
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match err {
            RagError::UpstreamUnavailable { service, attempts, .. } => {
                assert_eq!(service, "complete");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = Retrier::new(policy(5))
            .run("embed", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RagError::EmbeddingError {
                    provider: "test".into(),
                    message: "401 Unauthorized".into(),
                    retryable: false,
                })
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, RagError::EmbeddingError { retryable: false, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_calls_time_out() {
        let err = Retrier::new(policy(2))
            .run("complete", || std::future::pending::<Result<()>>())
            .await
            .unwrap_err();

        match err {
            RagError::UpstreamUnavailable { attempts, message, .. } => {
                assert_eq!(attempts, 2);
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
