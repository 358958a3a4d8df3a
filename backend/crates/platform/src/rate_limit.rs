//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by client.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 5 attempts per 10 minutes, the budget for credential endpoints.
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(10 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Duration,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request against `key` and report whether it is allowed.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

// ============================================================================
// In-process store
// ============================================================================

/// Sweep expired windows once the table grows past this many keys.
const SWEEP_THRESHOLD: usize = 10_000;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Single-node fixed-window limiter.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn hit(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: Instant,
    ) -> Result<RateLimitResult, RateLimitError> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|e| RateLimitError::Unavailable(e.to_string()))?;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started_at) < config.window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now.duration_since(window.started_at) >= config.window {
            window.started_at = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);

        let allowed = window.count <= config.max_requests;
        if !allowed {
            tracing::warn!(
                key = %key,
                count = window.count,
                max = config.max_requests,
                "Rate limit exceeded"
            );
        }

        Ok(RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(window.count),
            retry_after: config
                .window
                .saturating_sub(now.duration_since(window.started_at)),
        })
    }
}

impl RateLimitStore for InMemoryRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        self.hit(key, config, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_after_budget() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::default();
        let now = Instant::now();

        for expected_remaining in (0..5).rev() {
            let r = limiter.hit("1.2.3.4", &config, now).unwrap();
            assert!(r.allowed);
            assert_eq!(r.remaining, expected_remaining);
        }
        assert!(!limiter.hit("1.2.3.4", &config, now).unwrap().allowed);

        // other clients are unaffected
        assert!(limiter.hit("5.6.7.8", &config, now).unwrap().allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);
        let now = Instant::now();

        assert!(limiter.hit("k", &config, now).unwrap().allowed);
        assert!(!limiter.hit("k", &config, now).unwrap().allowed);
        let later = now + Duration::from_secs(61);
        assert!(limiter.hit("k", &config, later).unwrap().allowed);
    }

    #[tokio::test]
    async fn test_store_trait() {
        let limiter = InMemoryRateLimiter::new();
        let config = RateLimitConfig::new(2, 60);
        let r = RateLimitStore::check_and_increment(&limiter, "k", &config)
            .await
            .unwrap();
        assert_eq!(r.remaining, 1);
    }
}
