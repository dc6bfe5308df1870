//! Retry with exponential backoff for tracker requests
//!
//! Transient failures (connection drops, timeouts, 5xx, rate limiting) are
//! retried with exponential backoff and jitter. Everything else fails fast.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    pub initial_backoff: Duration,

    pub max_backoff: Duration,

    /// Backoff multiplier (2.0 doubles the wait after every failure)
    pub multiplier: f64,

    /// Add up to 25% random jitter to each wait
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default backoff with a specific retry budget
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self::with_max_retries(0)
    }

    /// Backoff duration before retry number `attempt` (0-based)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_backoff.as_secs_f64());

        if self.jitter {
            Duration::from_secs_f64(capped * (1.0 + jitter_fraction() * 0.25))
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Pseudo-random fraction in [0, 1) taken from the clock's sub-second nanos
fn jitter_fraction() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1000) / 1000.0
}

/// Retry classification for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    /// Retry after a server-provided delay (Retry-After)
    RetryAfter(Duration),
    /// Permanent failure
    NoRetry,
}

/// Errors that know whether the failed request is worth repeating
pub trait RetryableError {
    fn retry_decision(&self) -> RetryDecision;
}

/// Run `operation` until it succeeds, fails permanently, or the retry budget is spent
///
/// `request` names the operation in log output. The last error is returned
/// when all attempts fail.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, request: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let backoff = match err.retry_decision() {
            RetryDecision::NoRetry => {
                debug!(request, attempt, error = %err, "Request failed permanently");
                return Err(err);
            }
            _ if attempt >= config.max_retries => {
                warn!(request, attempts = attempt + 1, error = %err, "Giving up on request");
                return Err(err);
            }
            RetryDecision::RetryAfter(delay) => delay.min(config.max_backoff),
            RetryDecision::Retry => config.backoff_duration(attempt),
        };

        warn!(
            request,
            attempt = attempt + 1,
            max_attempts = config.max_retries + 1,
            backoff_secs = backoff.as_secs_f64(),
            error = %err,
            "Retrying request"
        );

        sleep(backoff).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let config = RetryConfig {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            jitter: false,
            ..Default::default()
        };

        assert_eq!(config.backoff_duration(0), Duration::from_secs(1));
        assert_eq!(config.backoff_duration(1), Duration::from_secs(2));
        assert_eq!(config.backoff_duration(3), Duration::from_secs(8));
        assert_eq!(config.backoff_duration(4), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig {
            initial_backoff: Duration::from_secs(2),
            jitter: true,
            ..Default::default()
        };

        let backoff = config.backoff_duration(0);
        assert!(backoff >= Duration::from_secs(2));
        assert!(backoff <= Duration::from_millis(2500));
    }

    #[derive(Debug)]
    struct Flaky {
        transient: bool,
    }

    impl std::fmt::Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky(transient={})", self.transient)
        }
    }

    impl RetryableError for Flaky {
        fn retry_decision(&self) -> RetryDecision {
            if self.transient {
                RetryDecision::Retry
            } else {
                RetryDecision::NoRetry
            }
        }
    }

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            jitter: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_transient_failures_recover() {
        let mut calls = 0;

        let result: Result<u32, Flaky> = with_retry(&fast(3), "search", || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(Flaky { transient: true })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let mut calls = 0;

        let result: Result<(), Flaky> = with_retry(&fast(2), "search", || {
            calls += 1;
            async { Err(Flaky { transient: true }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let mut calls = 0;

        let result: Result<(), Flaky> = with_retry(&fast(5), "issue", || {
            calls += 1;
            async { Err(Flaky { transient: false }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_none_never_retries() {
        let mut calls = 0;

        let result: Result<(), Flaky> = with_retry(&RetryConfig::none(), "issue", || {
            calls += 1;
            async { Err(Flaky { transient: true }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
