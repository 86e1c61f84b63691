//! Typed records persisted by the store.
//!
//! Every record carries a schema version so future format changes can be
//! migrated on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Current record schema version.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Policy review lifecycle.
///
/// Transitions only move forward:
/// `Uploaded → Extracted → Matched → Compared`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// Document stored; extraction payload may already be attached.
    Uploaded,
    /// Insurer and wording-version fields populated by extraction.
    Extracted,
    /// Resolved to exactly one wording record.
    Matched,
    /// Schedule/wording comparison recorded.
    Compared,
}

impl PolicyStatus {
    /// Position in the lifecycle, for monotonicity checks.
    pub fn rank(self) -> u8 {
        match self {
            PolicyStatus::Uploaded => 0,
            PolicyStatus::Extracted => 1,
            PolicyStatus::Matched => 2,
            PolicyStatus::Compared => 3,
        }
    }
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PolicyStatus::Uploaded => "uploaded",
            PolicyStatus::Extracted => "extracted",
            PolicyStatus::Matched => "matched",
            PolicyStatus::Compared => "compared",
        };
        f.write_str(label)
    }
}

/// A customer's uploaded policy schedule and its review state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyRecord {
    pub schema_version: u32,
    pub id: String,
    pub customer_id: String,
    /// Original file name of the uploaded document, when known.
    pub file_name: Option<String>,
    /// MIME type of the uploaded document, when known.
    pub content_type: Option<String>,
    pub status: PolicyStatus,
    /// Raw extracted insurer name (free text).
    pub insurer: Option<String>,
    /// Raw extracted wording-version string (free text).
    pub wording_version: Option<String>,
    /// Reference to the matched wording record. Set once by the matcher and
    /// immutable thereafter.
    pub wording_id: Option<String>,
    /// Stored extraction result (structured JSON or plain text envelope).
    pub extraction: Option<JsonValue>,
    /// Flattened extraction text used for prompting (comparison, chat).
    pub ocr_text: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl PolicyRecord {
    /// New record in `Uploaded` state.
    pub fn new(id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            id: id.into(),
            customer_id: customer_id.into(),
            file_name: None,
            content_type: None,
            status: PolicyStatus::Uploaded,
            insurer: None,
            wording_version: None,
            wording_id: None,
            extraction: None,
            ocr_text: None,
            received_at: Utc::now(),
        }
    }
}

/// A reference wording: the full legal text of a policy form, identified by
/// insurer + version as entered by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordingRecord {
    pub schema_version: u32,
    pub id: String,
    pub insurer: String,
    pub wording_version: String,
    /// File name of the uploaded wording document, when one was uploaded.
    pub file_name: Option<String>,
    /// Full wording body text.
    pub wording_text: String,
    pub uploaded_at: DateTime<Utc>,
}

impl WordingRecord {
    pub fn new(
        insurer: impl Into<String>,
        wording_version: impl Into<String>,
        wording_text: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            insurer: insurer.into(),
            wording_version: wording_version.into(),
            file_name: None,
            wording_text: wording_text.into(),
            uploaded_at: Utc::now(),
        }
    }
}

/// A broker customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRecord {
    pub schema_version: u32,
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl CustomerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A stored schedule/wording comparison result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub schema_version: u32,
    pub id: String,
    pub policy_id: String,
    /// The comparison report as produced by the compare stage.
    pub report: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(policy_id: impl Into<String>, report: JsonValue) -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            policy_id: policy_id.into(),
            report,
            created_at: Utc::now(),
        }
    }
}
