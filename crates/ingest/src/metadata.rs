//! Metadata normalization and policy enforcement for the upload crate.
//!
//! Sanitizes metadata strings, applies defaults, and enforces the configured
//! [`MetadataPolicy`] rules before records flow further down the pipeline.
//!
//! # Metadata Flow
//!
//! ```text
//! UploadMetadata (raw)
//!        │
//!        ▼
//! 1. Sanitize strings (strip control chars, trim)
//! 2. Apply defaults (customer_id, doc_id via UUIDv5, received_at)
//! 3. Validate policies (required fields, attribute size, timestamps)
//!        │
//!        ▼
//! NormalizedMetadata (canonical)
//! ```
use chrono::{DateTime, Utc};

use crate::config::{MetadataPolicy, RequiredField, UploadConfig};
use crate::error::UploadError;
use crate::types::UploadMetadata;

/// Result of metadata normalization: all fields guaranteed present, unlike
/// [`UploadMetadata`] where most are optional.
#[derive(Debug)]
pub(crate) struct NormalizedMetadata {
    /// Non-empty customer identifier (policy-enforced or defaulted).
    pub(crate) customer_id: String,

    /// Non-empty document identifier (provided or UUIDv5-derived).
    pub(crate) doc_id: String,

    /// Valid timestamp (provided or ingest time).
    pub(crate) received_at: DateTime<Utc>,

    /// Sanitized original source reference.
    pub(crate) original_source: Option<String>,

    /// Size-checked attributes JSON.
    pub(crate) attributes: Option<serde_json::Value>,
}

/// Normalizes and validates metadata fields.
///
/// # Errors
///
/// [`UploadError::InvalidMetadata`] when a required field is missing, the
/// attributes exceed the configured size, or a future timestamp is rejected
/// by policy.
pub(crate) fn normalize_metadata(
    metadata: UploadMetadata,
    cfg: &UploadConfig,
    record_id: &str,
) -> Result<NormalizedMetadata, UploadError> {
    let UploadMetadata {
        customer_id,
        doc_id,
        received_at,
        original_source,
        attributes,
    } = metadata;

    // Enforce size limits on the attributes JSON blob before anything else.
    enforce_attribute_limit(attributes.as_ref(), &cfg.metadata_policy)?;

    let customer_id_clean = sanitize_optional_string(customer_id, cfg.strip_control_chars);
    enforce_required_metadata(
        &cfg.metadata_policy,
        RequiredField::CustomerId,
        customer_id_clean.is_some(),
    )?;
    let customer_id = customer_id_clean.unwrap_or_else(|| cfg.default_customer_id.clone());

    let doc_id_clean = sanitize_optional_string(doc_id, cfg.strip_control_chars);
    enforce_required_metadata(
        &cfg.metadata_policy,
        RequiredField::DocId,
        doc_id_clean.is_some(),
    )?;
    let doc_id = doc_id_clean.unwrap_or_else(|| derive_doc_id(cfg, &customer_id, record_id));

    enforce_required_metadata(
        &cfg.metadata_policy,
        RequiredField::ReceivedAt,
        received_at.is_some(),
    )?;
    let now = Utc::now();
    if cfg.metadata_policy.reject_future_timestamps
        && matches!(received_at.as_ref(), Some(ts) if *ts > now)
    {
        return Err(UploadError::InvalidMetadata(
            "received_at lies in the future".into(),
        ));
    }
    let received_at = received_at.unwrap_or(now);

    let original_source = sanitize_optional_string(original_source, cfg.strip_control_chars);
    enforce_required_metadata(
        &cfg.metadata_policy,
        RequiredField::OriginalSource,
        original_source.is_some(),
    )?;

    Ok(NormalizedMetadata {
        customer_id,
        doc_id,
        received_at,
        original_source,
        attributes,
    })
}

/// Derives a deterministic document ID from the customer and record IDs.
///
/// ```text
/// material = customer_id + "\0" + record_id
/// doc_id = UUIDv5(config.doc_id_namespace, material)
/// ```
///
/// The null byte separator prevents collisions between different
/// customer/record combinations (e.g. ("foo", "bar") vs ("fo", "obar")).
pub(crate) fn derive_doc_id(cfg: &UploadConfig, customer_id: &str, record_id: &str) -> String {
    let mut material = Vec::with_capacity(customer_id.len() + record_id.len() + 1);
    material.extend_from_slice(customer_id.as_bytes());
    material.push(0);
    material.extend_from_slice(record_id.as_bytes());
    uuid::Uuid::new_v5(&cfg.doc_id_namespace, &material).to_string()
}

/// Checks the serialized attributes size against the configured limit.
fn enforce_attribute_limit(
    attributes: Option<&serde_json::Value>,
    policy: &MetadataPolicy,
) -> Result<(), UploadError> {
    if let (Some(limit), Some(value)) = (policy.max_attribute_bytes, attributes) {
        let serialized = serde_json::to_vec(value).map_err(|err| {
            UploadError::InvalidMetadata(format!("attributes serialization failed: {err}"))
        })?;
        if serialized.len() > limit {
            return Err(UploadError::InvalidMetadata(format!(
                "attributes exceed {limit} bytes (got {})",
                serialized.len()
            )));
        }
    }
    Ok(())
}

/// Enforces that a field marked required by the policy is present after
/// sanitization.
fn enforce_required_metadata(
    policy: &MetadataPolicy,
    field: RequiredField,
    present: bool,
) -> Result<(), UploadError> {
    if policy.required_fields.contains(&field) && !present {
        return Err(UploadError::InvalidMetadata(format!(
            "{field:?} is required by upload policy"
        )));
    }
    Ok(())
}

/// Strips control characters (when enabled), trims whitespace, and maps
/// empty results to `None`.
pub(crate) fn sanitize_optional_string(
    value: Option<String>,
    strip_control: bool,
) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Sanitizes a field that must have a value (like the record ID); errors if
/// the result is empty.
pub(crate) fn sanitize_required_field(
    field: &str,
    value: String,
    strip_control: bool,
) -> Result<String, UploadError> {
    sanitize_optional_string(Some(value), strip_control)
        .ok_or_else(|| UploadError::InvalidMetadata(format!("{field} empty")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_doc_id_is_deterministic() {
        let cfg = UploadConfig::default();
        let a = derive_doc_id(&cfg, "acme-brokers", "record-123");
        let b = derive_doc_id(&cfg, "acme-brokers", "record-123");
        assert_eq!(a, b);

        let c = derive_doc_id(&cfg, "other-brokers", "record-123");
        assert_ne!(a, c);
    }

    #[test]
    fn derive_doc_id_separator_prevents_collisions() {
        let cfg = UploadConfig::default();
        assert_ne!(
            derive_doc_id(&cfg, "ab", "c"),
            derive_doc_id(&cfg, "a", "bc")
        );
    }

    #[test]
    fn sanitize_strips_control_chars_and_trims() {
        let out = sanitize_optional_string(Some("  Acme\u{7}Brokers  ".into()), true);
        assert_eq!(out, Some("AcmeBrokers".into()));

        let out = sanitize_optional_string(Some("   ".into()), true);
        assert_eq!(out, None);
    }

    #[test]
    fn required_customer_enforced() {
        let cfg = UploadConfig::default();
        let metadata = UploadMetadata {
            customer_id: None,
            doc_id: None,
            received_at: None,
            original_source: None,
            attributes: None,
        };
        let err = normalize_metadata(metadata, &cfg, "rec-1").unwrap_err();
        assert!(matches!(err, UploadError::InvalidMetadata(_)));
    }

    #[test]
    fn oversized_attributes_rejected() {
        let cfg = UploadConfig {
            metadata_policy: MetadataPolicy {
                max_attribute_bytes: Some(8),
                ..Default::default()
            },
            ..Default::default()
        };
        let metadata = UploadMetadata {
            customer_id: Some("acme".into()),
            doc_id: None,
            received_at: None,
            original_source: None,
            attributes: Some(serde_json::json!({"note": "far too large for the limit"})),
        };
        let err = normalize_metadata(metadata, &cfg, "rec-1").unwrap_err();
        assert!(matches!(err, UploadError::InvalidMetadata(_)));
    }
}
