//! Covercheck completion client.
//!
//! Every "hard" operation in the review pipeline (document understanding,
//! schedule/wording comparison, question answering) is delegated to a remote
//! completion endpoint. This crate is the one place that talks to it:
//!
//! - **Modes**: `"api"` posts to the configured HTTP endpoint; `"stub"` is a
//!   deterministic offline stand-in used by tests and local development.
//! - **Resilience**: retry with exponential backoff + jitter, a per-provider
//!   circuit breaker, and a client-side token-bucket rate limiter, all
//!   configurable and on by default in api mode.
//! - **Output recovery**: helpers that strip Markdown code fences from
//!   output that was supposed to be strict JSON, keeping the raw text in the
//!   error when parsing still fails.
//!
//! ```no_run
//! use llm::{complete, CompletionRequest, LlmConfig};
//!
//! # async fn run() -> Result<(), llm::LlmError> {
//! let cfg = LlmConfig {
//!     mode: "api".into(),
//!     api_url: Some("https://llm.internal.example.com/v1/responses".into()),
//!     ..Default::default()
//! };
//! let completion = complete(
//!     CompletionRequest::new("extract-fields", "Extract the insurer name."),
//!     &cfg,
//! )
//! .await?;
//! println!("{}", completion.output_text);
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod error;
mod json;
pub mod resilience;
pub(crate) mod serde_millis;
mod stub;
mod types;

pub use config::LlmConfig;
pub use error::LlmError;
pub use json::{clean_json_output, parse_json_output};
pub use resilience::{CircuitBreakerConfig, CircuitState, RateLimitConfig, RetryConfig};
pub use types::{Completion, CompletionRequest};

use tracing::debug;

/// Run a completion request against the configured endpoint.
///
/// Dispatches on [`LlmConfig::mode`]: `"stub"` never touches the network and
/// is fully deterministic; `"api"` goes through the resilience stack. Any
/// other mode is an [`LlmError::InvalidConfig`].
pub async fn complete(
    request: CompletionRequest,
    cfg: &LlmConfig,
) -> Result<Completion, LlmError> {
    if request.prompt.trim().is_empty() {
        return Err(LlmError::InvalidConfig("prompt must not be empty".into()));
    }

    match cfg.mode.as_str() {
        "stub" => {
            let completion = stub::make_stub_completion(&request, cfg);
            debug!(task = %completion.task, "stub completion served");
            Ok(completion)
        }
        "api" => api::complete_via_api(&request, cfg).await,
        other => Err(LlmError::InvalidConfig(format!(
            "unknown llm mode '{other}' (expected \"api\" or \"stub\")"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_mode_round_trip() {
        let cfg = LlmConfig::stub_with_output("{\"ok\": true}");
        let completion = complete(CompletionRequest::new("test", "prompt"), &cfg)
            .await
            .unwrap();
        assert_eq!(completion.output_text, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn empty_prompt_rejected() {
        let cfg = LlmConfig::stub();
        let err = complete(CompletionRequest::new("test", "   "), &cfg)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn unknown_mode_rejected() {
        let cfg = LlmConfig {
            mode: "psychic".into(),
            ..LlmConfig::stub()
        };
        let err = complete(CompletionRequest::new("test", "prompt"), &cfg)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig(_)));
    }
}
