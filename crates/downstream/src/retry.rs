//! Fixed-delay retry policy shared by every downstream client.

use std::future::Future;
use std::time::Duration;

use crate::error::DownstreamError;

/// Decides whether a failed call is worth another attempt.
pub type RetryPredicate = fn(&DownstreamError) -> bool;

/// Retries a downstream call with a fixed delay between attempts.
///
/// A call is attempted at most `max_retries + 1` times. Only errors
/// matching the predicate are retried; anything else is returned after
/// the first attempt. When retries run out, the last error is returned
/// as-is.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    retryable: RetryPredicate,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    /// Creates a policy that retries server errors.
    pub fn fixed_delay(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            retryable: DownstreamError::is_server_error,
        }
    }

    /// Replaces the retryable-error predicate.
    pub fn with_predicate(mut self, retryable: RetryPredicate) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_retryable(&self, err: &DownstreamError) -> bool {
        (self.retryable)(err)
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, DownstreamError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if self.is_retryable(&err) && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        operation,
                        service = %err.service(),
                        attempt = retries + 1,
                        max_attempts = self.max_attempts(),
                        error = %err,
                        "retrying downstream call"
                    );
                    metrics::counter!("downstream_retries_total", "service" => err.service().as_str())
                        .increment(1);
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => {
                    if retries > 0 && self.is_retryable(&err) {
                        tracing::warn!(operation, attempts = retries + 1, error = %err, "retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed_delay(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{Service, classify};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::fixed_delay(3, Duration::from_millis(1))
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay(), Duration::from_secs(1));
        assert!(policy.is_retryable(&classify(Service::Reviews, 500, "")));
        assert!(!policy.is_retryable(&classify(Service::Reviews, 400, "")));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast_policy()
            .run("test", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(classify(Service::Reviews, 400, "invalid")) }
            })
            .await;

        assert!(result.unwrap_err().is_client_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_exhausts_retries_and_keeps_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast_policy()
            .run("test", || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Err(classify(Service::MovieInfo, 500, format!("boom {n}"))) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result.unwrap_err() {
            DownstreamError::Server {
                service,
                status,
                message,
            } => {
                assert_eq!(service, Service::MovieInfo);
                assert_eq!(status, 500);
                assert_eq!(message, "boom 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_between_attempts() {
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = RetryPolicy::fixed_delay(3, Duration::from_secs(1))
            .run("test", || async { Err(classify(Service::Reviews, 500, "down")) })
            .await;

        assert!(result.is_err());
        // three sleeps between four attempts
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_returns_without_delay() {
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = RetryPolicy::fixed_delay(3, Duration::from_secs(1))
            .run("test", || async { Err(classify(Service::Reviews, 404, "missing")) })
            .await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = fast_policy()
            .run("test", || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(classify(Service::Reviews, 503, "unavailable"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_single_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = RetryPolicy::fixed_delay(0, Duration::ZERO)
            .run("test", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(classify(Service::Reviews, 500, "down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_predicate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let policy = fast_policy().with_predicate(|_| false);
        let result: Result<(), _> = policy
            .run("test", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(classify(Service::Reviews, 500, "down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
