//! Core data model types for the upload crate.
//!
//! These types represent the shape of upload requests and the normalized
//! records that flow to downstream pipeline stages (extraction, matching).
//! They are designed to be:
//!
//! - **Serializable**: JSON support via serde
//! - **Cloneable**: Cheap to clone for pipeline processing
//! - **Comparable**: Support equality checks for testing
//! - **Extensible**: Marked `#[non_exhaustive]` where appropriate
//!
//! # Type Hierarchy
//!
//! ```text
//! RawUploadRecord
//! ├── id: String
//! ├── source: UploadSource
//! ├── metadata: UploadMetadata
//! │   ├── customer_id: Option<String>
//! │   ├── doc_id: Option<String>
//! │   ├── received_at: Option<DateTime<Utc>>
//! │   ├── original_source: Option<String>
//! │   └── attributes: Option<Value>
//! └── payload: Option<UploadPayload>
//!     ├── Text(String)
//!     ├── TextBytes(Vec<u8>)
//!     └── Binary(Vec<u8>)
//!
//!         ↓ ingest()
//!
//! CanonicalUploadRecord
//! ├── id: String (sanitized)
//! ├── customer_id: String (policy enforced)
//! ├── doc_id: String (derived or provided)
//! ├── received_at: DateTime<Utc> (default applied)
//! ├── original_source: Option<String> (sanitized)
//! ├── source: UploadSource
//! ├── normalized_payload: Option<CanonicalPayload>
//! │   ├── Text(String) (whitespace normalized)
//! │   └── Binary(Vec<u8>) (preserved)
//! └── attributes: Option<Value>
//! ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source kinds accepted at upload time.
///
/// `UploadSource` identifies where a policy document came from, which affects
/// validation rules (e.g. whether a payload is required).
///
/// # Payload Requirements
///
/// | Source | Payload Required |
/// |--------|-----------------|
/// | `Portal` | Yes |
/// | `File` | Yes |
/// | `Api` | No |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadSource {
    /// Document text pasted or submitted directly through the broker portal.
    ///
    /// Requires a text payload; the content is whitespace-normalized during
    /// ingest.
    Portal,

    /// An uploaded file (typically a PDF policy schedule or wording).
    ///
    /// Requires a payload (text or binary) and captures file metadata for
    /// downstream processing and version matching.
    File {
        /// The original filename of the uploaded document.
        filename: String,
        /// Optional MIME type (e.g. "application/pdf").
        content_type: Option<String>,
    },

    /// Catch-all for uploads originating from an API call.
    ///
    /// Unlike the other sources, `Api` does not require a payload, making it
    /// suitable for metadata-only events.
    Api,
}

/// Metadata associated with an upload request.
///
/// All fields are optional at this layer; required-field policy is applied
/// during normalization according to [`MetadataPolicy`](crate::MetadataPolicy).
///
/// # Field Defaults
///
/// | Field | Default Behavior |
/// |-------|------------------|
/// | `customer_id` | Falls back to `UploadConfig::default_customer_id` (when not required) |
/// | `doc_id` | Derived via UUIDv5 if not provided |
/// | `received_at` | Set to current UTC time |
/// | `original_source` | Remains `None` if not provided |
/// | `attributes` | Remains `None` if not provided |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadMetadata {
    /// Customer the policy document belongs to.
    ///
    /// Required by the default metadata policy: a policy schedule without a
    /// customer cannot progress through the review lifecycle.
    pub customer_id: Option<String>,

    /// Optional document identifier.
    ///
    /// When `None` or empty after sanitization, a deterministic UUIDv5 is
    /// generated using `UploadConfig::doc_id_namespace`:
    /// `UUIDv5(namespace, customer_id + "\0" + record_id)`
    pub doc_id: Option<String>,

    /// Optional timestamp when the document was received.
    ///
    /// When `None`, defaults to the current UTC time at ingest. Can be
    /// validated against future time when
    /// [`MetadataPolicy::reject_future_timestamps`](crate::MetadataPolicy::reject_future_timestamps)
    /// is enabled.
    pub received_at: Option<DateTime<Utc>>,

    /// Optional original source reference (e.g. a mailbox or portal URL).
    ///
    /// Control characters are stripped during sanitization.
    pub original_source: Option<String>,

    /// Arbitrary JSON attributes for extensibility.
    ///
    /// Size is limited by
    /// [`MetadataPolicy::max_attribute_bytes`](crate::MetadataPolicy::max_attribute_bytes)
    /// when configured.
    pub attributes: Option<serde_json::Value>,
}

/// The inbound record for an upload.
///
/// `RawUploadRecord` is the primary input type for the upload pipeline. It
/// contains identification, source metadata, and the optional document
/// payload.
///
/// # Lifecycle
///
/// 1. Create `RawUploadRecord` with raw data
/// 2. Call [`ingest()`](crate::ingest) to validate and normalize
/// 3. Receive [`CanonicalUploadRecord`] for extraction and storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawUploadRecord {
    /// Unique identifier for this upload operation.
    ///
    /// Used for tracing and log correlation, deterministic doc-id derivation
    /// (when `doc_id` is not provided), and idempotency. Should be unique per
    /// upload request.
    pub id: String,

    /// Source of the document. Affects validation rules, see [`UploadSource`].
    pub source: UploadSource,

    /// Metadata associated with the record, see [`UploadMetadata`].
    pub metadata: UploadMetadata,

    /// Raw document content. May be `None` for metadata-only events
    /// (`UploadSource::Api`).
    pub payload: Option<UploadPayload>,
}

impl Default for RawUploadRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            source: UploadSource::Api,
            metadata: UploadMetadata {
                customer_id: None,
                doc_id: None,
                received_at: None,
                original_source: None,
                attributes: None,
            },
            payload: None,
        }
    }
}

/// Raw payload content provided during upload.
///
/// # Processing
///
/// | Variant | Validation | Normalization |
/// |---------|-----------|---------------|
/// | `Text` | None | Whitespace collapsed |
/// | `TextBytes` | UTF-8 | Whitespace collapsed |
/// | `Binary` | Non-empty | None |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadPayload {
    /// UTF-8 text payload (e.g. a pasted wording body).
    Text(String),

    /// Raw bytes expected to be valid UTF-8; decoded and validated during
    /// ingest. Invalid UTF-8 yields
    /// [`UploadError::InvalidUtf8`](crate::UploadError::InvalidUtf8).
    TextBytes(Vec<u8>),

    /// Arbitrary binary payload (PDFs and scans). Passed through unchanged
    /// apart from a non-empty check; the extraction stage forwards it to the
    /// document-understanding endpoint as-is.
    Binary(Vec<u8>),
}

/// Normalized record produced by ingest.
///
/// # Guarantees
///
/// - All required fields are present (customer_id, doc_id, received_at)
/// - Metadata is sanitized (control characters stripped)
/// - Payload is normalized (text whitespace collapsed, binary preserved)
/// - Document ID is stable (derived deterministically if not provided)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalUploadRecord {
    /// Unique identifier for this upload (mirrors [`RawUploadRecord::id`],
    /// sanitized).
    pub id: String,

    /// Effective customer identifier after applying policy and defaults.
    pub customer_id: String,

    /// Effective document identifier (provided or UUIDv5-derived).
    pub doc_id: String,

    /// Effective received timestamp (provided or ingest time).
    pub received_at: DateTime<Utc>,

    /// Sanitized original source reference, if provided.
    pub original_source: Option<String>,

    /// Source of the document (mirrors [`RawUploadRecord::source`]).
    pub source: UploadSource,

    /// Normalized payload ready for the extraction stage.
    pub normalized_payload: Option<CanonicalPayload>,

    /// Attributes JSON preserved for downstream use (size-checked).
    pub attributes: Option<serde_json::Value>,
}

impl CanonicalUploadRecord {
    /// Returns true if this record has a text payload.
    pub fn has_text_payload(&self) -> bool {
        matches!(self.normalized_payload, Some(CanonicalPayload::Text(_)))
    }

    /// Returns true if this record has a binary payload.
    pub fn has_binary_payload(&self) -> bool {
        matches!(self.normalized_payload, Some(CanonicalPayload::Binary(_)))
    }

    /// Returns the text payload if present, otherwise None.
    pub fn text_payload(&self) -> Option<&str> {
        match &self.normalized_payload {
            Some(CanonicalPayload::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns the binary payload if present, otherwise None.
    pub fn binary_payload(&self) -> Option<&[u8]> {
        match &self.normalized_payload {
            Some(CanonicalPayload::Binary(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the uploaded file name when the record came from a file.
    pub fn file_name(&self) -> Option<&str> {
        match &self.source {
            UploadSource::File { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

/// Normalized payload ready for downstream stages.
///
/// Text payloads have whitespace collapsed; binary payloads pass through
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum CanonicalPayload {
    /// Normalized UTF-8 text (whitespace collapsed, edges trimmed).
    Text(String),

    /// Binary payload preserved for the document-understanding endpoint.
    Binary(Vec<u8>),
}

impl CanonicalPayload {
    /// Returns the length of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            CanonicalPayload::Text(s) => s.len(),
            CanonicalPayload::Binary(b) => b.len(),
        }
    }

    /// Returns true if the payload is empty.
    ///
    /// Empty payloads should never reach this stage (they are rejected during
    /// ingest); provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this is a text payload.
    pub fn is_text(&self) -> bool {
        matches!(self, CanonicalPayload::Text(_))
    }

    /// Returns true if this is a binary payload.
    pub fn is_binary(&self) -> bool {
        matches!(self, CanonicalPayload::Binary(_))
    }
}
