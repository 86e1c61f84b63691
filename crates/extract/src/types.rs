use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// What the document-understanding pass produced.
///
/// The model is asked for a structured result first; when its output cannot
/// be parsed, a plain-text fallback pass runs instead. Downstream code
/// matches on the variant rather than poking at an untyped blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// Strict-JSON extraction succeeded.
    Structured {
        /// Extracted tables (limits, deductibles, sublimits), shape defined
        /// by the prompt schema.
        tables: JsonValue,
        /// Full or summarised readable text.
        text: Option<String>,
        /// Document metadata (insurer, wording version/reference, dates).
        metadata: JsonValue,
    },
    /// Fallback pass: plain text only.
    PlainText { text: String },
}

impl ExtractionResult {
    /// Text rendition used for prompting (comparison, chat) and stored as
    /// the policy's `ocr_text`. Structured results render as pretty JSON so
    /// the table values survive verbatim.
    pub fn flattened_text(&self) -> String {
        match self {
            ExtractionResult::Structured { .. } => serde_json::to_string_pretty(self)
                .unwrap_or_else(|_| String::new()),
            ExtractionResult::PlainText { text } => text.clone(),
        }
    }

    /// Insurer name from structured metadata, tolerating the `issued_by`
    /// alias some schedules use.
    pub fn metadata_insurer(&self) -> Option<String> {
        self.metadata_field(&["insurer", "issued_by"])
    }

    /// Wording version from structured metadata, tolerating the
    /// `wording_reference` alias.
    pub fn metadata_wording_version(&self) -> Option<String> {
        self.metadata_field(&["wording_version", "wording_reference"])
    }

    fn metadata_field(&self, names: &[&str]) -> Option<String> {
        let ExtractionResult::Structured { metadata, .. } = self else {
            return None;
        };
        names
            .iter()
            .filter_map(|name| metadata.get(name))
            .filter_map(JsonValue::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// The two fields the matcher needs, both guaranteed non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedFields {
    pub insurer: String,
    pub wording_version: String,
}
