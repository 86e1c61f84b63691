use thiserror::Error;

/// Errors surfaced by the extraction stage.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The completion client failed.
    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),

    /// The model answered but a required field was absent or empty.
    #[error("extraction did not return {field}")]
    MissingField { field: &'static str },

    /// There is nothing to extract from (no text and no document bytes).
    #[error("no document content to extract from")]
    EmptyDocument,
}
