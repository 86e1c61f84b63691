//! Rate limiting for API providers.
//!
//! Prevents exceeding provider rate limits using a token bucket.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests per second (sustained rate).
    pub requests_per_second: f64,
    /// Burst capacity (maximum requests that can be made instantly).
    pub burst_size: u64,
    /// Maximum wait time for a token in milliseconds (0 = fail immediately
    /// if no token available).
    #[serde(with = "crate::serde_millis")]
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10.0,
            burst_size: 20,
            max_wait: Duration::from_secs(5),
        }
    }
}

impl RateLimitConfig {
    pub fn with_requests_per_second(mut self, rps: f64) -> Self {
        self.requests_per_second = rps;
        self
    }

    pub fn with_burst_size(mut self, burst: u64) -> Self {
        self.burst_size = burst;
        self
    }

    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }
}

/// Token bucket rate limiter.
#[derive(Debug)]
pub struct TokenBucket {
    config: RateLimitConfig,
    tokens: Mutex<f64>,
    last_update: Mutex<Instant>,
    total_requests: AtomicU64,
    total_rejected: AtomicU64,
}

impl TokenBucket {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            tokens: Mutex::new(config.burst_size as f64),
            last_update: Mutex::new(Instant::now()),
            total_requests: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
        }
    }

    /// Add tokens based on elapsed time.
    fn add_tokens(&self) {
        let mut last_update = self.last_update.lock().unwrap();
        let mut tokens = self.tokens.lock().unwrap();

        let now = Instant::now();
        let elapsed = now.duration_since(*last_update).as_secs_f64();
        *last_update = now;

        let new_tokens = elapsed * self.config.requests_per_second;
        *tokens = (*tokens + new_tokens).min(self.config.burst_size as f64);
    }

    /// Try to acquire a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.add_tokens();

        let mut tokens = self.tokens.lock().unwrap();
        self.total_requests.fetch_add(1, Ordering::SeqCst);

        if *tokens >= 1.0 {
            *tokens -= 1.0;
            true
        } else {
            self.total_rejected.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    /// Acquire a token, waiting up to max_wait if necessary.
    /// Returns true if a token was acquired, false on timeout.
    pub fn acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::SeqCst);

        let start = Instant::now();

        loop {
            self.add_tokens();

            {
                let mut tokens = self.tokens.lock().unwrap();
                if *tokens >= 1.0 {
                    *tokens -= 1.0;
                    return true;
                }
            }

            if start.elapsed() >= self.config.max_wait {
                self.total_rejected.fetch_add(1, Ordering::SeqCst);
                return false;
            }

            // Wait roughly one token's worth of time before re-checking.
            let wait_ms = (1000.0 / self.config.requests_per_second).ceil() as u64;
            std::thread::sleep(Duration::from_millis(wait_ms.clamp(1, 100)));
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected.load(Ordering::SeqCst)
    }
}

/// Manager for per-provider token buckets.
pub struct RateLimitManager {
    buckets: Mutex<std::collections::HashMap<String, Arc<TokenBucket>>>,
    default_config: RateLimitConfig,
}

impl RateLimitManager {
    pub fn new(default_config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(std::collections::HashMap::new()),
            default_config,
        }
    }

    /// Get or create a bucket for a provider with the default config.
    pub fn get_or_create(&self, provider: &str) -> Arc<TokenBucket> {
        let mut buckets = self.buckets.lock().unwrap();
        buckets
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(TokenBucket::new(self.default_config)))
            .clone()
    }

    /// Get or create a bucket with an explicit config.
    pub fn get_or_create_with_config(
        &self,
        provider: &str,
        config: RateLimitConfig,
    ) -> Arc<TokenBucket> {
        let mut buckets = self.buckets.lock().unwrap();
        buckets
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(TokenBucket::new(config)))
            .clone()
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
