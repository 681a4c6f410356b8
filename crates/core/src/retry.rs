//! Bounded retry with exponential backoff for upstream calls.
//!
//! Every external request goes through [`with_retry`]: transient failures
//! (timeouts, connect errors, 429 and 5xx) are retried a fixed number of
//! times, after which the error is turned into the module's
//! "upstream unavailable" kind.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::NetworkConfig;
use crate::metrics::UPSTREAM_RETRIES;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further attempt.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl From<&NetworkConfig> for RetryConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            max_retries: config.retries,
            base_delay: Duration::from_millis(config.backoff_ms),
            ..Default::default()
        }
    }
}

/// Errors that know whether a retry can help.
pub trait Retryable: Sized {
    /// Whether this error is transient.
    fn is_retryable(&self) -> bool;

    /// Convert a transient error into the "upstream unavailable" kind once
    /// the retry budget is spent.
    fn exhausted(self, operation: &str, attempts: u32) -> Self;
}

/// Execute an async operation with bounded retry.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = config.delay_for(attempt);
                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Upstream call failed, retrying: {}",
                    e
                );
                UPSTREAM_RETRIES.with_label_values(&[operation]).inc();
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) if e.is_retryable() => return Err(e.exhausted(operation, attempt + 1)),
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
        Unavailable(u32),
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }

        fn exhausted(self, _operation: &str, attempts: u32) -> Self {
            Self::Unavailable(attempts)
        }
    }

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&fast(), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&fast(), "op", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(TestError::Transient)
            } else {
                Ok(1)
            }
        })
        .await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_unavailable() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&fast(), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Transient)
        })
        .await;
        assert_eq!(result, Err(TestError::Unavailable(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = with_retry(&fast(), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Fatal)
        })
        .await;
        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        assert_eq!(config.delay_for(0), Duration::from_millis(100));
        assert_eq!(config.delay_for(1), Duration::from_millis(200));
        assert_eq!(config.delay_for(2), Duration::from_millis(300));
        assert_eq!(config.delay_for(40), Duration::from_millis(300));
    }

    #[test]
    fn test_from_network_config() {
        let network = NetworkConfig {
            timeout_secs: 5,
            connect_timeout_secs: 1,
            retries: 2,
            backoff_ms: 250,
        };
        let config = RetryConfig::from(&network);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_delay, Duration::from_millis(250));
    }
}
