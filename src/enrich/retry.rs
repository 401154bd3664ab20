//! Retry with linear backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How many times to retry a failed call, and how long to wait between.
///
/// The wait before retry `n` (1-based) is `base_delay × n`, so a policy
/// of 3 retries at 1 s makes at most 4 attempts, waiting 1 s, 2 s, 3 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that gives up after the first failure
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Wait before retry `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 0-based attempt number. The last error is returned
/// once every attempt has failed.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
