//! Configuration types for the upload pipeline.
//!
//! This module defines [`UploadConfig`] and [`MetadataPolicy`], which control
//! how raw upload requests are interpreted, defaulted, and constrained at
//! runtime. Both types are cheap to clone and serializable from external
//! configuration formats (JSON, TOML, YAML).
//!
//! ```rust
//! use ingest::UploadConfig;
//!
//! let config = UploadConfig::default();
//! config.validate().expect("invalid configuration");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Runtime configuration for upload behavior.
///
/// Controls validation, normalization, size limits, and ID generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Semantic version of the upload configuration. Increment on breaking
    /// behavior changes.
    pub version: u32,

    /// Customer ID applied when metadata doesn't specify one and the policy
    /// does not require it (API-sourced, metadata-only events).
    pub default_customer_id: String,

    /// Namespace UUID for deterministic document ID generation.
    ///
    /// When `doc_id` is not provided, a UUIDv5 is derived using
    /// `UUIDv5(doc_id_namespace, customer_id + "\0" + record_id)` so that
    /// re-uploading the same record is idempotent.
    pub doc_id_namespace: Uuid,

    /// Whether to strip ASCII control characters from metadata strings
    /// (`customer_id`, `doc_id`, `original_source`, record `id`). Prevents
    /// log injection; strongly recommended.
    pub strip_control_chars: bool,

    /// Additional metadata validation policies.
    #[serde(default)]
    pub metadata_policy: MetadataPolicy,

    /// Maximum raw payload byte length allowed, checked before any
    /// processing. `None` disables the limit.
    pub max_payload_bytes: Option<usize>,

    /// Maximum normalized text byte length allowed, checked after whitespace
    /// normalization. `None` disables the limit.
    pub max_normalized_bytes: Option<usize>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_customer_id: "unassigned".to_string(),
            doc_id_namespace: Uuid::NAMESPACE_OID,
            strip_control_chars: true,
            metadata_policy: MetadataPolicy::default(),
            max_payload_bytes: None,
            max_normalized_bytes: None,
        }
    }
}

impl UploadConfig {
    /// Validate the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::InvalidVersion);
        }
        if self.default_customer_id.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultCustomer);
        }
        if let (Some(raw), Some(normalized)) = (self.max_payload_bytes, self.max_normalized_bytes) {
            if normalized > raw {
                return Err(ConfigError::NormalizedLimitExceedsRaw { raw, normalized });
            }
        }
        Ok(())
    }
}

/// Metadata fields that can be marked as required by [`MetadataPolicy`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequiredField {
    CustomerId,
    DocId,
    ReceivedAt,
    OriginalSource,
}

/// Fine-grained metadata validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataPolicy {
    /// Fields that must be present (non-empty after sanitization).
    ///
    /// The default policy requires `customer_id`: a policy document that
    /// cannot be attributed to a customer cannot progress through the review
    /// lifecycle.
    pub required_fields: Vec<RequiredField>,

    /// Maximum serialized size of the attributes JSON blob in bytes.
    /// `None` disables the limit.
    pub max_attribute_bytes: Option<usize>,

    /// Reject records whose `received_at` lies in the future.
    pub reject_future_timestamps: bool,
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        Self {
            required_fields: vec![RequiredField::CustomerId],
            max_attribute_bytes: Some(64 * 1024),
            reject_future_timestamps: false,
        }
    }
}

/// Errors produced by [`UploadConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config version must be greater than zero")]
    InvalidVersion,

    #[error("default_customer_id must not be empty")]
    EmptyDefaultCustomer,

    #[error("max_normalized_bytes ({normalized}) exceeds max_payload_bytes ({raw})")]
    NormalizedLimitExceedsRaw { raw: usize, normalized: usize },
}
