//! Client-side request throttle
//!
//! A token bucket in front of every attempt, including retries, so a paginated
//! listing cannot outrun the account's API quota.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Throttle settings: steady rate plus the bucket size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Calls allowed per second once the bucket is empty
    pub requests_per_second: u32,
    /// Calls allowed back to back from a full bucket
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(10)
    }
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Steady rate with a burst of the same size
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second)
    }

    /// Settings for a configured rate; a rate of zero turns throttling off
    ///
    /// The burst defaults to the rate.
    pub fn from_rate(requests_per_second: u32, burst: Option<u32>) -> Option<Self> {
        (requests_per_second > 0)
            .then(|| Self::new(requests_per_second, burst.unwrap_or(requests_per_second)))
    }
}

/// Token bucket shared by clones of one client
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
            config: config.clone(),
        }
    }

    /// Wait for a permit and return how long the call was held back
    pub async fn acquire(&self) -> Duration {
        if self.limiter.check().is_ok() {
            return Duration::ZERO;
        }
        let start = Instant::now();
        self.limiter.until_ready().await;
        let waited = start.elapsed();
        debug!(
            waited_ms = waited.as_millis() as u64,
            requests_per_second = self.config.requests_per_second,
            "Throttled request"
        );
        waited
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// The settings this limiter was built from
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.config.requests_per_second)
            .field("burst_size", &self.config.burst_size)
            .finish()
    }
}
