//! Error types produced by the upload crate.
//!
//! The upload crate uses typed errors (not generic strings) so callers can
//! handle specific cases differently, map errors to the right HTTP status
//! codes, and log structured error information.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`MissingPayload`](UploadError::MissingPayload) | Validation | Source requires payload but none provided |
//! | [`EmptyBinaryPayload`](UploadError::EmptyBinaryPayload) | Validation | Binary payload has zero bytes |
//! | [`InvalidMetadata`](UploadError::InvalidMetadata) | Validation | Metadata policy violation |
//! | [`InvalidUtf8`](UploadError::InvalidUtf8) | Validation | TextBytes not valid UTF-8 |
//! | [`EmptyNormalizedText`](UploadError::EmptyNormalizedText) | Validation | Text empty after normalization |
//! | [`PayloadTooLarge`](UploadError::PayloadTooLarge) | Validation | Size limit exceeded |
use thiserror::Error;

/// Errors that can occur during upload normalization and validation.
///
/// All variants are cloneable, comparable, and displayable. The enum is
/// marked `#[non_exhaustive]` so future additions do not break callers;
/// always include a catch-all arm when matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    /// Missing payload for a source that requires one
    /// ([`Portal`](crate::UploadSource::Portal), [`File`](crate::UploadSource::File)).
    #[error("missing payload for source that requires payload")]
    MissingPayload,

    /// Binary payload is empty (zero bytes). Rejected to prevent meaningless
    /// uploads.
    #[error("binary payload is empty")]
    EmptyBinaryPayload,

    /// Invalid metadata or policy violation: required field missing,
    /// attributes exceed the size limit, future timestamp when rejected by
    /// policy, or a required field that is empty after sanitization. The
    /// message describes the specific violation.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// `TextBytes` payload contains bytes that cannot be decoded as UTF-8.
    ///
    /// Use [`Binary`](crate::UploadPayload::Binary) for non-text documents.
    #[error("invalid utf-8 payload: {0}")]
    InvalidUtf8(String),

    /// Text payload became empty after normalization (input was empty or
    /// whitespace-only).
    #[error("text payload empty after normalization")]
    EmptyNormalizedText,

    /// Payload violates `max_payload_bytes` (raw) or `max_normalized_bytes`
    /// (after normalization). Maps to HTTP 413 in the server layer.
    #[error("payload exceeds size limit: {0}")]
    PayloadTooLarge(String),
}

impl UploadError {
    /// Returns true if this error indicates a client-side issue.
    ///
    /// All upload errors are client-side issues (invalid input), so this
    /// always returns true; provided for API consistency with error types
    /// that have server-side variants.
    pub fn is_client_error(&self) -> bool {
        true
    }

    /// Returns a suggested HTTP status code for this error.
    ///
    /// - `PayloadTooLarge`: 413
    /// - All others: 400
    pub fn http_status_code(&self) -> u16 {
        match self {
            UploadError::PayloadTooLarge(_) => 413,
            _ => 400,
        }
    }
}
