//! Payload validation and normalization.
//!
//! Text payloads are UTF-8 validated (when supplied as bytes), whitespace
//! normalized, and size-checked. Binary payloads pass through unchanged apart
//! from a non-empty check.

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::types::{CanonicalPayload, UploadPayload, UploadSource};

/// Validates that sources which require a payload actually have one.
pub fn validate_payload_requirements(
    source: &UploadSource,
    payload: &Option<UploadPayload>,
) -> Result<(), UploadError> {
    let requires_payload = matches!(source, UploadSource::Portal | UploadSource::File { .. });
    if requires_payload && payload.is_none() {
        return Err(UploadError::MissingPayload);
    }
    Ok(())
}

/// Normalizes the payload based on its kind.
///
/// - `Text`/`TextBytes`: UTF-8 decode (bytes), whitespace collapse, emptiness
///   and normalized-size checks.
/// - `Binary`: non-empty check only.
pub fn normalize_payload_option(
    _source: &UploadSource,
    payload: Option<UploadPayload>,
    cfg: &UploadConfig,
) -> Result<Option<CanonicalPayload>, UploadError> {
    let Some(payload) = payload else {
        return Ok(None);
    };

    match payload {
        UploadPayload::Text(text) => normalize_text(text, cfg).map(Some),
        UploadPayload::TextBytes(bytes) => {
            let text = String::from_utf8(bytes)
                .map_err(|err| UploadError::InvalidUtf8(err.to_string()))?;
            normalize_text(text, cfg).map(Some)
        }
        UploadPayload::Binary(bytes) => {
            if bytes.is_empty() {
                return Err(UploadError::EmptyBinaryPayload);
            }
            Ok(Some(CanonicalPayload::Binary(bytes)))
        }
    }
}

fn normalize_text(text: String, cfg: &UploadConfig) -> Result<CanonicalPayload, UploadError> {
    let normalized = crate::normalize_payload(&text);
    if normalized.is_empty() {
        return Err(UploadError::EmptyNormalizedText);
    }
    if let Some(limit) = cfg.max_normalized_bytes {
        if normalized.len() > limit {
            return Err(UploadError::PayloadTooLarge(format!(
                "normalized payload size {} exceeds limit of {limit}",
                normalized.len()
            )));
        }
    }
    Ok(CanonicalPayload::Text(normalized))
}

/// Human-readable payload kind label for structured logs.
pub fn payload_kind(payload: Option<&CanonicalPayload>) -> &'static str {
    match payload {
        Some(CanonicalPayload::Text(_)) => "text",
        Some(CanonicalPayload::Binary(_)) => "binary",
        None => "none",
    }
}

/// Payload length in bytes, 0 when absent. For structured logs.
pub fn payload_length(payload: Option<&CanonicalPayload>) -> usize {
    payload.map(CanonicalPayload::len).unwrap_or(0)
}
