use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend read/write failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Record (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The requested record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A lifecycle transition was rejected.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// The policy already references a wording; the match relationship is
    /// set once and immutable thereafter.
    #[error("policy {policy_id} is already matched to wording {wording_id}")]
    MatchAlreadyRecorded {
        policy_id: String,
        wording_id: String,
    },
}

impl StoreError {
    pub(crate) fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
