use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::{
    execute_with_retry_async, is_retryable_error, CircuitBreakerManager, RateLimitManager,
    RetryConfig, RetryResult, TokenBucket,
};
use crate::{Completion, CompletionRequest, LlmConfig, LlmError};

// Global managers for resilience (lazy-initialized)
static CIRCUIT_BREAKER_MANAGER: Lazy<CircuitBreakerManager> =
    Lazy::new(CircuitBreakerManager::default);
static RATE_LIMIT_MANAGER: Lazy<RateLimitManager> = Lazy::new(RateLimitManager::default);

// Global HTTP client with connection pooling
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to build HTTP client")
});

/// Get the provider name string for resilience tracking.
fn provider_name(cfg: &LlmConfig) -> String {
    cfg.api_provider
        .as_deref()
        .unwrap_or("custom")
        .to_ascii_lowercase()
}

fn effective_model(request: &CompletionRequest, cfg: &LlmConfig) -> String {
    if request.use_comparison_model {
        cfg.comparison_model.clone()
    } else {
        cfg.model.clone()
    }
}

/// Handles API-based completion with resilience.
pub(crate) async fn complete_via_api(
    request: &CompletionRequest,
    cfg: &LlmConfig,
) -> Result<Completion, LlmError> {
    let url = cfg
        .api_url
        .as_deref()
        .ok_or_else(|| LlmError::InvalidConfig("api_url is required for api mode".into()))?;
    let provider = provider_name(cfg);
    let model = effective_model(request, cfg);

    if cfg.enable_resilience {
        // 1. Check circuit breaker
        let cb = CIRCUIT_BREAKER_MANAGER.get_or_create(&provider);
        if !cb.allow_request() {
            return Err(LlmError::CircuitOpen(provider));
        }

        // 2. Check rate limit
        let rate_limiter = get_rate_limiter(cfg, &provider);
        if !rate_limiter.acquire() {
            return Err(LlmError::RateLimited(provider));
        }
    }

    let payload = json!({
        "model": model,
        "input": request.prompt,
        "max_output_tokens": request.max_output_tokens.unwrap_or(cfg.max_output_tokens),
    });

    // Execute with retry logic if resilience is enabled
    let response_result = if cfg.enable_resilience {
        let retry_cfg = cfg.retry_config.unwrap_or_default();
        execute_api_request_with_retry(url, cfg, payload, &retry_cfg, &provider).await
    } else {
        match send_api_request(url, cfg, payload).await {
            Ok(r) => Ok(RetryResult {
                result: Ok(r),
                attempts: 1,
                total_duration: Duration::from_millis(0),
                succeeded: true,
            }),
            Err(e) => Err(e),
        }
    };

    match response_result {
        Ok(retry_result) => {
            if cfg.enable_resilience {
                let cb = CIRCUIT_BREAKER_MANAGER.get_or_create(&provider);
                cb.record_success();
            }

            let attempts = retry_result.attempts;
            let response = retry_result.into_result().map_err(LlmError::Completion)?;
            let output_text = parse_output_text_from_value(response)?;

            Ok(Completion {
                task: request.task.clone(),
                output_text,
                model,
                attempts,
            })
        }
        Err(e) => {
            if cfg.enable_resilience {
                let cb = CIRCUIT_BREAKER_MANAGER.get_or_create(&provider);
                cb.record_failure();
            }
            Err(e)
        }
    }
}

/// Get or create the rate limiter for a provider.
fn get_rate_limiter(cfg: &LlmConfig, provider: &str) -> Arc<TokenBucket> {
    if let Some(ref config) = cfg.rate_limit_config {
        RATE_LIMIT_MANAGER.get_or_create_with_config(provider, *config)
    } else {
        RATE_LIMIT_MANAGER.get_or_create(provider)
    }
}

/// Execute an API request with retry logic.
async fn execute_api_request_with_retry(
    url: &str,
    cfg: &LlmConfig,
    payload: Value,
    retry_cfg: &RetryConfig,
    provider: &str,
) -> Result<RetryResult<Value>, LlmError> {
    let url = url.to_string();
    let cfg = cfg.clone();

    let result = execute_with_retry_async(retry_cfg, |attempt| {
        let url = url.clone();
        let cfg = cfg.clone();
        let payload = payload.clone();

        async move {
            if attempt > 0 {
                tracing::warn!(attempt, provider, "retrying completion request");
            }

            match send_api_request(&url, &cfg, payload).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    let error_str = e.to_string();
                    // Only retry on retryable errors
                    if is_retryable_error(&error_str) {
                        Err(error_str)
                    } else {
                        Err(format!("Non-retryable error: {error_str}"))
                    }
                }
            }
        }
    })
    .await;

    if result.succeeded {
        Ok(result)
    } else {
        Err(LlmError::Completion(
            result
                .result
                .err()
                .unwrap_or_else(|| "Request failed after retries".to_string()),
        ))
    }
}

async fn send_api_request(url: &str, cfg: &LlmConfig, payload: Value) -> Result<Value, LlmError> {
    let mut request = HTTP_CLIENT.post(url);
    request = request.header("Content-Type", "application/json");
    if let Some(header) = cfg.api_auth_header.as_deref() {
        request = request.header("Authorization", header);
    }
    if let Some(timeout) = cfg.api_timeout_secs {
        request = request.timeout(Duration::from_secs(timeout));
    }

    let response = request
        .json(&payload)
        .send()
        .await
        .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Transport(format!("HTTP error {status}: {body}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| LlmError::Completion(format!("Invalid JSON response: {e}")))
}

/// Pulls the output text out of the provider response.
///
/// Accepted shapes, in order: `{"output_text": "..."}` (responses API),
/// `{"choices": [{"message": {"content": "..."}}]}` (chat completions), and
/// `{"text": "..."}` (custom endpoints).
fn parse_output_text_from_value(value: Value) -> Result<String, LlmError> {
    if let Some(text) = value.get("output_text").and_then(Value::as_str) {
        return Ok(text.to_string());
    }

    if let Some(content) = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
    {
        return Ok(content.to_string());
    }

    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Ok(text.to_string());
    }

    Err(LlmError::Completion(
        "API response did not contain output text".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_responses_api_shape() {
        let value = json!({ "output_text": "the answer" });
        assert_eq!(parse_output_text_from_value(value).unwrap(), "the answer");
    }

    #[test]
    fn parses_chat_completions_shape() {
        let value = json!({
            "choices": [{ "message": { "role": "assistant", "content": "the answer" } }]
        });
        assert_eq!(parse_output_text_from_value(value).unwrap(), "the answer");
    }

    #[test]
    fn parses_custom_shape() {
        let value = json!({ "text": "the answer" });
        assert_eq!(parse_output_text_from_value(value).unwrap(), "the answer");
    }

    #[test]
    fn missing_output_is_an_error() {
        let value = json!({ "usage": { "output_tokens": 12 } });
        assert!(parse_output_text_from_value(value).is_err());
    }

    #[test]
    fn api_mode_requires_url() {
        let cfg = LlmConfig {
            mode: "api".into(),
            api_url: None,
            enable_resilience: false,
            ..Default::default()
        };
        let request = CompletionRequest::new("test", "prompt");
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(complete_via_api(&request, &cfg)).unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig(_)));
    }

    #[test]
    fn comparison_flag_picks_comparison_model() {
        let cfg = LlmConfig::default();
        let request = CompletionRequest::new("compare", "prompt").with_comparison_model();
        assert_eq!(effective_model(&request, &cfg), cfg.comparison_model);

        let request = CompletionRequest::new("extract", "prompt");
        assert_eq!(effective_model(&request, &cfg), cfg.model);
    }
}
