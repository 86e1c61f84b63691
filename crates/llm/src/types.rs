use serde::{Deserialize, Serialize};

/// A single completion request against the configured endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Logical task label ("extract-document", "compare", "chat-select", ...)
    /// surfaced in logs and metrics; never sent to the provider.
    pub task: String,
    /// Full prompt text.
    pub prompt: String,
    /// Output-token budget; falls back to `LlmConfig::max_output_tokens`.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Use the heavier comparison model instead of the default one.
    #[serde(default)]
    pub use_comparison_model: bool,
}

impl CompletionRequest {
    pub fn new(task: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            prompt: prompt.into(),
            max_output_tokens: None,
            use_comparison_model: false,
        }
    }

    /// Cap the output-token budget for this request.
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Route this request to the comparison-tier model.
    pub fn with_comparison_model(mut self) -> Self {
        self.use_comparison_model = true;
        self
    }
}

/// Result of a completion call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    /// Task label copied from the request.
    pub task: String,
    /// Raw model output text (fences not yet stripped; see
    /// [`clean_json_output`](crate::clean_json_output)).
    pub output_text: String,
    /// Model that produced the output.
    pub model: String,
    /// Number of attempts made (1 = no retries needed).
    pub attempts: u32,
}
