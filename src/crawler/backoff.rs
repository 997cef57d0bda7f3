//! Retry policy for fetch tasks
//!
//! After failed attempt `a` (counting from 1) the task waits `2^a` backoff units
//! and tries again, until `a` exceeds the retry limit. A task therefore makes at
//! most `retry_limit + 1` attempts. Non-retryable errors end the loop at once.

use crate::config::PipelineConfig;
use crate::TrawlError;
use std::future::Future;
use std::time::Duration;

/// Whether an error is worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Timeouts, transport failures and non-2xx responses
    Retryable,

    /// Anything else; aborts the task without further attempts
    NonRetryable,
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Exponential backoff without jitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    retry_limit: u32,
    unit: Duration,
    max_wait: Option<Duration>,
}

impl BackoffPolicy {
    pub fn new(retry_limit: u32, unit: Duration, max_wait: Option<Duration>) -> Self {
        Self {
            retry_limit,
            unit,
            max_wait,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.retry_limit,
            Duration::from_millis(config.backoff_unit_ms),
            config.max_backoff_secs.map(Duration::from_secs),
        )
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Upper bound on the number of attempts a task makes
    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Wait before the attempt following failed attempt `attempt`
    pub fn wait_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let wait = self.unit.saturating_mul(factor);

        match self.max_wait {
            Some(max_wait) => wait.min(max_wait),
            None => wait,
        }
    }

    /// Decides what follows failed attempt `attempt` with an error of class `class`
    ///
    /// # Example
    ///
    /// ```
    /// use jobtrawl::crawler::{BackoffPolicy, ErrorClass, RetryDecision};
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::new(3, Duration::from_secs(1), None);
    /// assert_eq!(
    ///     policy.decide(1, ErrorClass::Retryable),
    ///     RetryDecision::RetryAfter(Duration::from_secs(2))
    /// );
    /// assert_eq!(policy.decide(4, ErrorClass::Retryable), RetryDecision::GiveUp);
    /// assert_eq!(policy.decide(1, ErrorClass::NonRetryable), RetryDecision::GiveUp);
    /// ```
    pub fn decide(&self, attempt: u32, class: ErrorClass) -> RetryDecision {
        match class {
            ErrorClass::NonRetryable => RetryDecision::GiveUp,
            ErrorClass::Retryable if attempt > self.retry_limit => RetryDecision::GiveUp,
            ErrorClass::Retryable => RetryDecision::RetryAfter(self.wait_for(attempt)),
        }
    }
}

/// Runs `operation` until it succeeds or the policy gives up
///
/// The last error is returned once retries are exhausted. `label` names the
/// work in log lines, usually the URL being fetched.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, TrawlError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TrawlError>>,
{
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        match policy.decide(attempt, error.class()) {
            RetryDecision::RetryAfter(wait) => {
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                    attempt,
                    policy.max_attempts(),
                    label,
                    error,
                    wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            RetryDecision::GiveUp => {
                if error.class() == ErrorClass::Retryable {
                    tracing::error!("Giving up on {} after {} attempts: {}", label, attempt, error);
                }
                return Err(error);
            }
        }
    }
}
