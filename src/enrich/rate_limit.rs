//! Spacing of calls to the text-generation service

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use std::time::Duration;

/// Gate in front of every service call.
///
/// `acquire` returns once the caller may make one call.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

/// One call per `interval`, no burst. `None` for a zero interval.
pub fn interval_quota(interval: Duration) -> Option<Quota> {
    Quota::with_period(interval)
}

/// Enforces a minimum interval between the starts of consecutive calls.
///
/// Backed by a `governor` GCRA limiter with a burst of one, so the first
/// call goes through immediately. A zero interval never waits. The limiter
/// runs on the system clock, not tokio's.
pub struct IntervalLimiter {
    interval: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl IntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            limiter: interval_quota(interval).map(governor::RateLimiter::direct),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for IntervalLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalLimiter")
            .field("interval", &self.interval)
            .finish()
    }
}

#[async_trait]
impl RateLimiter for IntervalLimiter {
    async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
