use thiserror::Error;

/// Errors surfaced by the `complete` function and the output parse helpers.
#[derive(Debug, Error, Clone)]
pub enum LlmError {
    /// Configuration is inconsistent (e.g. api mode without an api_url).
    #[error("invalid llm config: {0}")]
    InvalidConfig(String),

    /// HTTP transport failure talking to the completion endpoint.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint answered but the completion failed (provider error body,
    /// missing output text, retries exhausted).
    #[error("completion failure: {0}")]
    Completion(String),

    /// The circuit breaker is open for the provider; the endpoint is being
    /// given time to recover.
    #[error("circuit open for provider '{0}'")]
    CircuitOpen(String),

    /// The client-side rate limit rejected the request.
    #[error("rate limited for provider '{0}'")]
    RateLimited(String),

    /// Model output could not be parsed as the expected JSON. Carries the
    /// raw output so operators can inspect what the model actually said.
    #[error("model returned invalid JSON: {message}")]
    InvalidJson { message: String, raw: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_contain_context() {
        let err = LlmError::InvalidConfig("api_url is required for api mode".into());
        assert!(err.to_string().contains("api_url"));

        let err = LlmError::CircuitOpen("openai".into());
        assert!(err.to_string().contains("openai"));

        let err = LlmError::InvalidJson {
            message: "expected value".into(),
            raw: "not json".into(),
        };
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn errors_are_cloneable() {
        let variants = vec![
            LlmError::InvalidConfig("a".into()),
            LlmError::Transport("b".into()),
            LlmError::Completion("c".into()),
            LlmError::CircuitOpen("d".into()),
            LlmError::RateLimited("e".into()),
        ];
        for err in variants {
            let _cloned = err.clone();
        }
    }
}
