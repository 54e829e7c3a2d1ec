//! Retry with exponential backoff.
//!
//! Used for the directory lookup, where one dropped request should not
//! prevent a run from starting. Transfer workers do not retry: they simply
//! move on to their next request.

use log::{debug, warn};
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Default number of retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Maximum delay cap for exponential backoff.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every further one.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_retries, base_delay, max_delay }
    }

    /// A configuration that makes exactly one attempt.
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt,
    /// capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed on every attempt.
    Failed {
        /// The error of the final attempt.
        last_error: E,
        /// Number of attempts made.
        attempts: u32,
    },
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    /// Converts to Result, keeping the last error.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed { last_error, .. } => Err(last_error),
        }
    }
}

/// Run `f` until it succeeds or `config.max_retries` retries are used up.
pub async fn retry_async<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> RetryResult<T, E>
where
    E: Error,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt + 1);
                }
                return RetryResult::Success(value);
            }
            Err(error) if attempt + 1 < total_attempts => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "{}: attempt {} failed: {}; retrying in {:?}",
                    operation_name,
                    attempt + 1,
                    error,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                warn!(
                    "{}: all {} attempts failed. Last error: {}",
                    operation_name, total_attempts, error
                );
                return RetryResult::Failed {
                    last_error: error,
                    attempts: total_attempts,
                };
            }
        }
    }
}
