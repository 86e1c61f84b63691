use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] covercheck::PipelineError),

    #[error("Upload error: {0}")]
    Upload(#[from] ingest::UploadError),

    #[error("Extract error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Match error: {0}")]
    Match(#[from] matcher::MatchError),

    #[error("Compare error: {0}")]
    Compare(#[from] compare::CompareError),

    #[error("Chat error: {0}")]
    Chat(#[from] chat::ChatError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("LLM error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,

            ServerError::Upload(err) => match err.http_status_code() {
                413 => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            },
            ServerError::Pipeline(covercheck::PipelineError::Upload(err)) => {
                match err.http_status_code() {
                    413 => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                }
            }
            ServerError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,

            ServerError::Extract(extract::ExtractError::MissingField { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Extract(extract::ExtractError::EmptyDocument) => StatusCode::BAD_REQUEST,
            ServerError::Extract(extract::ExtractError::Llm(err)) => llm_status(err),

            ServerError::Match(matcher::MatchError::EmptyInsurer) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            ServerError::Compare(compare::CompareError::MissingInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Compare(compare::CompareError::Llm(err)) => llm_status(err),

            ServerError::Chat(chat::ChatError::NoPolicies) => StatusCode::NOT_FOUND,
            ServerError::Chat(chat::ChatError::EmptyMessage) => StatusCode::BAD_REQUEST,
            ServerError::Chat(chat::ChatError::Llm(err)) => llm_status(err),

            ServerError::Store(store::StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Store(store::StoreError::MatchAlreadyRecorded { .. })
            | ServerError::Store(store::StoreError::InvalidTransition { .. }) => {
                StatusCode::CONFLICT
            }
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServerError::Llm(err) => llm_status(err),

            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Validation(_) => "VALIDATION_FAILED",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Pipeline(_) => "PIPELINE_ERROR",
            ServerError::Upload(_) => "UPLOAD_ERROR",
            ServerError::Extract(_) => "EXTRACT_ERROR",
            ServerError::Match(_) => "MATCH_ERROR",
            ServerError::Compare(_) => "COMPARE_ERROR",
            ServerError::Chat(_) => "CHAT_ERROR",
            ServerError::Store(store::StoreError::NotFound { .. }) => "NOT_FOUND",
            ServerError::Store(store::StoreError::MatchAlreadyRecorded { .. }) => {
                "MATCH_ALREADY_RECORDED"
            }
            ServerError::Store(store::StoreError::InvalidTransition { .. }) => {
                "INVALID_TRANSITION"
            }
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::Llm(_) => "LLM_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

fn llm_status(err: &llm::LlmError) -> StatusCode {
    match err {
        llm::LlmError::CircuitOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
        llm::LlmError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        llm::LlmError::Transport(_)
        | llm::LlmError::Completion(_)
        | llm::LlmError::InvalidJson { .. } => StatusCode::BAD_GATEWAY,
        llm::LlmError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
