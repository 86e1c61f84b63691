//! Circuit breaker pattern for API resilience.
//!
//! The circuit breaker stops requests to a failing endpoint after a threshold
//! of failures is reached, then periodically lets a test request through
//! (half-open state) to check if the service has recovered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Duration to wait before attempting to close the circuit (half-open).
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }
}

/// Current state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, requests are allowed.
    Closed,
    /// Circuit is open, requests are rejected.
    Open,
    /// Circuit is half-open, allowing test requests.
    HalfOpen,
}

/// Circuit breaker implementation for preventing cascading failures.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<CircuitState>,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    last_state_change: Mutex<Instant>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CircuitState::Closed),
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            last_state_change: Mutex::new(Instant::now()),
        }
    }

    /// Check if a request should be allowed through.
    pub fn allow_request(&self) -> bool {
        let mut state = self.state.lock().unwrap();

        match *state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                // Check if we should transition to half-open
                let last_change = *self.last_state_change.lock().unwrap();
                if last_change.elapsed() >= self.config.reset_timeout {
                    *state = CircuitState::HalfOpen;
                    *self.last_state_change.lock().unwrap() = Instant::now();
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => true,
        }
    }

    /// Record a successful request.
    pub fn record_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.lock().unwrap();
        match *state {
            CircuitState::HalfOpen => {
                // Transition back to closed after success in half-open
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                *self.last_state_change.lock().unwrap() = Instant::now();
            }
            CircuitState::Closed => {
                // Reset failure count on success
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed request.
    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;

        let mut state = self.state.lock().unwrap();
        match *state {
            CircuitState::Closed => {
                if failures >= self.config.failure_threshold as u64 {
                    *state = CircuitState::Open;
                    *self.last_state_change.lock().unwrap() = Instant::now();
                }
            }
            CircuitState::HalfOpen => {
                // Transition back to open on failure in half-open
                *state = CircuitState::Open;
                *self.last_state_change.lock().unwrap() = Instant::now();
            }
            CircuitState::Open => {}
        }
    }

    /// Get the current state.
    pub fn current_state(&self) -> CircuitState {
        *self.state.lock().unwrap()
    }

    /// Get failure count.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Get success count.
    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::Relaxed)
    }
}

/// Manager for multiple circuit breakers (one per provider).
pub struct CircuitBreakerManager {
    breakers: Mutex<std::collections::HashMap<String, Arc<CircuitBreaker>>>,
    default_config: CircuitBreakerConfig,
}

impl CircuitBreakerManager {
    pub fn new(default_config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: Mutex::new(std::collections::HashMap::new()),
            default_config,
        }
    }

    /// Get or create a circuit breaker for a provider.
    pub fn get_or_create(&self, provider: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap();
        breakers
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(self.default_config)))
            .clone()
    }

    /// Get or create a circuit breaker with an explicit config.
    pub fn get_or_create_with_config(
        &self,
        provider: &str,
        config: CircuitBreakerConfig,
    ) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap();
        breakers
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(config)))
            .clone()
    }

    /// Check if a provider is healthy (circuit closed).
    pub fn is_healthy(&self, provider: &str) -> bool {
        let breakers = self.breakers.lock().unwrap();
        breakers
            .get(provider)
            .map(|cb| cb.current_state() == CircuitState::Closed)
            .unwrap_or(true)
    }

    /// Reset all circuit breakers.
    pub fn reset_all(&self) {
        let mut breakers = self.breakers.lock().unwrap();
        breakers.clear();
    }
}

impl Default for CircuitBreakerManager {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
