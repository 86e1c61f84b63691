use serde::{Deserialize, Serialize};

use crate::resilience::{CircuitBreakerConfig, RateLimitConfig, RetryConfig};

/// Runtime configuration describing which completion endpoint and model to
/// use, and how aggressively to protect it.
///
/// # Example
/// ```no_run
/// use llm::{complete, CompletionRequest, LlmConfig};
///
/// let cfg = LlmConfig {
///     mode: "api".into(),
///     api_url: Some("https://llm.internal.example.com/v1/responses".into()),
///     api_auth_header: Some("Bearer sk-xxx".into()),
///     ..Default::default()
/// };
///
/// let _ = complete(CompletionRequest::new("extract", "Extract the insurer."), &cfg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Mode selector: `"api"` (remote HTTP endpoint) or `"stub"`
    /// (deterministic offline stub, the test vehicle).
    pub mode: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Model used when a request asks for the heavier comparison tier.
    pub comparison_model: String,
    /// Completion endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header value (e.g. `"Bearer sk-xxx"`).
    pub api_auth_header: Option<String>,
    /// Remote provider hint used to key the circuit breaker and rate
    /// limiter: `"openai"` or `"custom"` (default).
    pub api_provider: Option<String>,
    /// Overall API timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Default output-token budget applied when a request does not set one.
    pub max_output_tokens: u32,
    /// Canned stub output. When set and [`mode`](Self::mode) is `"stub"`,
    /// returned verbatim; otherwise the stub derives a deterministic JSON
    /// envelope from the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stub_output: Option<String>,
    /// Retry configuration for API calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    /// Circuit breaker configuration for API resilience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker_config: Option<CircuitBreakerConfig>,
    /// Rate limiting configuration for the API provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_config: Option<RateLimitConfig>,
    /// Whether to enable resilience features (retry, circuit breaker, rate
    /// limiting). Defaults to true for production safety.
    pub enable_resilience: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: "api".into(),
            model: "gpt-5-mini".into(),
            comparison_model: "gpt-5".into(),
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: Some(30),
            max_output_tokens: 2000,
            stub_output: None,
            retry_config: None,           // Uses defaults when None
            circuit_breaker_config: None, // Uses defaults when None
            rate_limit_config: None,      // Uses defaults when None
            enable_resilience: true,
        }
    }
}

impl LlmConfig {
    /// Convenience constructor for the deterministic stub mode used in tests.
    pub fn stub() -> Self {
        Self {
            mode: "stub".into(),
            enable_resilience: false,
            ..Default::default()
        }
    }

    /// Stub mode with a canned output, for exercising parse paths.
    pub fn stub_with_output(output: impl Into<String>) -> Self {
        Self {
            stub_output: Some(output.into()),
            ..Self::stub()
        }
    }
}
