//! Client-side request throttling
//!
//! Every lifecycle call in the process goes through the same client, so a
//! burst of parallel applies is smoothed here before it reaches the API's
//! own limiter and comes back as 429s.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Steady request rate plus the burst allowed on top of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    pub requests_per_second: u32,
    /// Requests that may go out back to back before throttling starts
    pub burst: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(10)
    }
}

impl RateLimiterConfig {
    /// Rate with a burst equal to one second's worth of requests
    pub fn per_second(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            burst: requests_per_second,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// Zero values are clamped to one so a misconfigured limit still lets
    /// requests through
    fn quota(&self) -> Quota {
        let clamp = |n: u32| NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(clamp(self.requests_per_second)).allow_burst(clamp(self.burst))
    }
}

/// Process-wide token bucket shared by clones of one client
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DirectLimiter>,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            inner: Arc::new(DirectLimiter::direct(config.quota())),
        }
    }

    /// Wait for a permit
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RateLimiter")
    }
}
