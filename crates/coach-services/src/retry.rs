//! Retry policy for transient model failures.

use std::future::Future;
use std::time::Duration;

use coach_core::CoachError;
use tokio::time::sleep;
use tracing::warn;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(2000);

/// How often and how long to wait when a request fails transiently.
///
/// The delay doubles for every retry. There is no jitter and no cap: the
/// retry budget alone bounds the total wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.initial_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Every delay the policy may wait, in order.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|retry| self.delay_for_retry(retry))
            .collect()
    }

    /// Run `operation` until it succeeds, fails non-transiently, or the
    /// retry budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, CoachError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoachError>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && retries < self.max_retries => {
                    let delay = self.delay_for_retry(retries);
                    retries += 1;
                    warn!(
                        "Transient failure ({}) - retry {}/{} after {}ms backoff",
                        err,
                        retries,
                        self.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
