//! Bounded retry with linear backoff
//!
//! A fetch runs as `Requesting -> {Success | Retryable -> Requesting | Terminal}`.
//! Each attempt classifies its own failure: transport errors and non-2xx
//! statuses are retryable, data-shape problems (empty result, bad payload)
//! are terminal. After the last attempt the final retryable error is wrapped
//! in `ExchangeError::Transport` together with the attempt count.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ExchangeError, RestError};

/// Outcome of one failed attempt
#[derive(Debug)]
pub enum AttemptError {
    /// Transient fault; try again if attempts remain
    Retryable(RestError),
    /// Give up immediately with this error
    Terminal(ExchangeError),
}

impl From<RestError> for AttemptError {
    fn from(err: RestError) -> Self {
        AttemptError::Retryable(err)
    }
}

impl From<ExchangeError> for AttemptError {
    fn from(err: ExchangeError) -> Self {
        AttemptError::Terminal(err)
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    /// Delay after attempt `n` is `base_delay * n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
        }
    }

    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        RetryPolicy::new(1, Duration::ZERO)
    }

    /// Backoff to wait after the given (1-based) failed attempt
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `operation` until it succeeds, fails terminally, or attempts run out
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ExchangeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("{} attempt {}/{}", operation, attempt, max_attempts);

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Terminal(err)) => return Err(err),
                Err(AttemptError::Retryable(err)) if attempt >= max_attempts => {
                    return Err(ExchangeError::Transport {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(AttemptError::Retryable(err)) => {
                    let delay = self.backoff_after(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}; retrying in {:?}",
                        operation, attempt, max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn unavailable(n: u32) -> RestError {
        RestError::Status {
            status: 503,
            body: format!("failure {}", n),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result = policy
            .run("price", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(AttemptError::Retryable(unavailable(attempt)))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error() {
        let policy = RetryPolicy::default();

        let result: Result<(), _> = policy
            .run("price", |attempt| async move {
                Err(AttemptError::Retryable(unavailable(attempt)))
            })
            .await;

        match result {
            Err(ExchangeError::Transport { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(source.to_string().contains("failure 3"));
            }
            other => panic!("expected Transport error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_is_not_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run("price", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(AttemptError::Terminal(ExchangeError::NoDataForSymbol(
                        "XYZUSDT".to_string(),
                    )))
                }
            })
            .await;

        assert!(matches!(result, Err(ExchangeError::NoDataForSymbol(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_backoff_between_attempts() {
        let policy = RetryPolicy::default();
        let start = Instant::now();
        let seen = Mutex::new(Vec::new());

        let _: Result<(), _> = policy
            .run("ticker", |attempt| {
                seen.lock().unwrap().push((attempt, start.elapsed()));
                async move { Err(AttemptError::Retryable(unavailable(attempt))) }
            })
            .await;

        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![
                (1, Duration::ZERO),
                (2, Duration::from_secs(1)),
                (3, Duration::from_secs(3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        let result: Result<(), _> = policy
            .run("price", |attempt| async move {
                Err(AttemptError::Retryable(unavailable(attempt)))
            })
            .await;

        assert!(matches!(
            result,
            Err(ExchangeError::Transport { attempts: 1, .. })
        ));
    }
}
