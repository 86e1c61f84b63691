//! Covercheck extraction stage.
//!
//! Two passes over the completion client:
//!
//! - [`extract_document`] reads an uploaded schedule (text or binary) into a
//!   typed [`ExtractionResult`]: strict JSON first, plain-text fallback when
//!   the model's output doesn't parse.
//! - [`extract_fields`] reads the stored extraction text and returns the two
//!   fields the matcher needs: insurer and wording version.
//!
//! Prompts pin the output shape hard (no markdown, no fences, JSON only)
//! because the matcher and comparison stages consume the result literally.

mod error;
mod types;

pub use error::ExtractError;
pub use types::{ExtractedFields, ExtractionResult};

use base64::Engine as _;
use llm::{complete, parse_json_output, CompletionRequest, LlmConfig, LlmError};
use serde_json::Value as JsonValue;
use tracing::warn;

/// Document content handed to [`extract_document`].
#[derive(Debug, Clone)]
pub enum DocumentContent<'a> {
    /// Normalized text (portal paste, text upload).
    Text(&'a str),
    /// Raw document bytes (PDF schedule). Forwarded base64-encoded.
    Binary {
        file_name: &'a str,
        bytes: &'a [u8],
    },
}

const DOCUMENT_PROMPT: &str = "\
You extract structured data from Australian insurance policy schedules.

STRICT RULES:
- Return ONLY pure JSON.
- NO markdown.
- NO code fences.
- NO explanations.
- JSON must start with '{' and end with '}'.

Extract with this schema:

{
  \"tables\": {...},
  \"text\": \"Full extracted readable text or summarised text.\",
  \"metadata\": {...}
}
If fields are missing, set them to null.";

const FALLBACK_PROMPT: &str = "Extract ONLY plain text from the document. No JSON.";

/// Run document understanding over an uploaded schedule.
///
/// The primary pass asks for strict JSON matching the extraction schema; if
/// the output cannot be parsed, a plain-text fallback pass runs and the
/// result is wrapped as [`ExtractionResult::PlainText`].
pub async fn extract_document(
    content: DocumentContent<'_>,
    cfg: &LlmConfig,
) -> Result<ExtractionResult, ExtractError> {
    let document_block = render_document_block(&content)?;

    let primary = complete(
        CompletionRequest::new(
            "extract-document",
            format!("{DOCUMENT_PROMPT}\n\n{document_block}"),
        ),
        cfg,
    )
    .await?;

    match parse_structured(&primary.output_text) {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!(error = %err, "primary JSON extraction failed, falling back to plain text");
            let fallback = complete(
                CompletionRequest::new(
                    "extract-document-fallback",
                    format!("{FALLBACK_PROMPT}\n\n{document_block}"),
                ),
                cfg,
            )
            .await?;
            Ok(ExtractionResult::PlainText {
                text: fallback.output_text,
            })
        }
    }
}

fn render_document_block(content: &DocumentContent<'_>) -> Result<String, ExtractError> {
    match content {
        DocumentContent::Text(text) => {
            if text.trim().is_empty() {
                return Err(ExtractError::EmptyDocument);
            }
            Ok(format!("Document text:\n---\n{text}\n---"))
        }
        DocumentContent::Binary { file_name, bytes } => {
            if bytes.is_empty() {
                return Err(ExtractError::EmptyDocument);
            }
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            Ok(format!(
                "Document file \"{file_name}\" (base64):\n---\n{encoded}\n---"
            ))
        }
    }
}

/// Parse a strict-JSON extraction output into a structured result.
fn parse_structured(output: &str) -> Result<ExtractionResult, LlmError> {
    let value = parse_json_output(output)?;
    let JsonValue::Object(mut map) = value else {
        return Err(LlmError::InvalidJson {
            message: "extraction output is not a JSON object".into(),
            raw: output.to_string(),
        });
    };

    let tables = map.remove("tables").unwrap_or(JsonValue::Null);
    let text = map
        .remove("text")
        .and_then(|v| v.as_str().map(str::to_string));
    let metadata = map.remove("metadata").unwrap_or(JsonValue::Null);

    Ok(ExtractionResult::Structured {
        tables,
        text,
        metadata,
    })
}

const FIELDS_PROMPT_HEADER: &str = "\
You extract structured data from Australian insurance policy schedules. \
Return strict JSON.

From the following policy schedule text, extract:

- insurer: name of the insurer entity (e.g. \"DUAL\", \"DUAL Australia Pty Limited\")
- wording_version: the policy wording version or reference (e.g. \"11.20\", \"V11.2\", etc.)

Return ONLY JSON in this shape:

{
  \"insurer\": \"string\",
  \"wording_version\": \"string\"
}

Policy schedule text:
---";

/// Ask the model for the insurer and wording-version fields.
///
/// Both fields must come back non-empty; a missing field is a typed error so
/// the caller can refuse to advance the policy lifecycle.
pub async fn extract_fields(
    ocr_text: &str,
    cfg: &LlmConfig,
) -> Result<ExtractedFields, ExtractError> {
    if ocr_text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let completion = complete(
        CompletionRequest::new(
            "extract-fields",
            format!("{FIELDS_PROMPT_HEADER}\n{ocr_text}\n---"),
        ),
        cfg,
    )
    .await?;

    let value = parse_json_output(&completion.output_text)?;
    let insurer = non_empty_field(&value, "insurer")
        .ok_or(ExtractError::MissingField { field: "insurer" })?;
    let wording_version = non_empty_field(&value, "wording_version").ok_or(
        ExtractError::MissingField {
            field: "wording_version",
        },
    )?;

    Ok(ExtractedFields {
        insurer,
        wording_version,
    })
}

fn non_empty_field(value: &JsonValue, name: &str) -> Option<String> {
    value
        .get(name)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn structured_extraction_parses() {
        let canned = r#"{"tables": {"limits": {"property": "$1m"}}, "text": "summary", "metadata": {"insurer": "DUAL Australia"}}"#;
        let cfg = LlmConfig::stub_with_output(canned);

        let result = extract_document(DocumentContent::Text("schedule body"), &cfg)
            .await
            .unwrap();

        match result {
            ExtractionResult::Structured {
                tables, metadata, ..
            } => {
                assert_eq!(tables["limits"]["property"], "$1m");
                assert_eq!(metadata["insurer"], "DUAL Australia");
            }
            other => panic!("expected structured result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fenced_output_still_parses() {
        let canned = "```json\n{\"tables\": null, \"text\": \"t\", \"metadata\": null}\n```";
        let cfg = LlmConfig::stub_with_output(canned);

        let result = extract_document(DocumentContent::Text("schedule body"), &cfg)
            .await
            .unwrap();
        assert!(matches!(result, ExtractionResult::Structured { .. }));
    }

    #[tokio::test]
    async fn unparseable_output_falls_back_to_plain_text() {
        // Non-JSON canned output fails the primary parse; the fallback pass
        // returns the same canned output, wrapped as plain text.
        let cfg = LlmConfig::stub_with_output("The schedule covers property and liability.");

        let result = extract_document(DocumentContent::Text("schedule body"), &cfg)
            .await
            .unwrap();
        match result {
            ExtractionResult::PlainText { text } => {
                assert!(text.contains("property and liability"));
            }
            other => panic!("expected plain-text fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn binary_content_is_accepted() {
        let canned = r#"{"tables": null, "text": null, "metadata": null}"#;
        let cfg = LlmConfig::stub_with_output(canned);

        let result = extract_document(
            DocumentContent::Binary {
                file_name: "schedule.pdf",
                bytes: &[0x25, 0x50, 0x44, 0x46],
            },
            &cfg,
        )
        .await
        .unwrap();
        assert!(matches!(result, ExtractionResult::Structured { .. }));
    }

    #[tokio::test]
    async fn empty_document_rejected() {
        let cfg = LlmConfig::stub();
        let err = extract_document(DocumentContent::Text("   "), &cfg)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[tokio::test]
    async fn fields_extraction_happy_path() {
        let cfg =
            LlmConfig::stub_with_output(r#"{"insurer": "DUAL Australia", "wording_version": "11.20"}"#);

        let fields = extract_fields("schedule text", &cfg).await.unwrap();
        assert_eq!(fields.insurer, "DUAL Australia");
        assert_eq!(fields.wording_version, "11.20");
    }

    #[tokio::test]
    async fn fields_extraction_trims_whitespace() {
        let cfg =
            LlmConfig::stub_with_output(r#"{"insurer": "  DUAL  ", "wording_version": " 11.20 "}"#);

        let fields = extract_fields("schedule text", &cfg).await.unwrap();
        assert_eq!(fields.insurer, "DUAL");
        assert_eq!(fields.wording_version, "11.20");
    }

    #[tokio::test]
    async fn missing_field_is_typed_error() {
        let cfg = LlmConfig::stub_with_output(r#"{"insurer": "DUAL", "wording_version": ""}"#);

        let err = extract_fields("schedule text", &cfg).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField {
                field: "wording_version"
            }
        ));
    }

    #[tokio::test]
    async fn non_json_fields_output_is_invalid_json() {
        let cfg = LlmConfig::stub_with_output("I could not find those fields.");

        let err = extract_fields("schedule text", &cfg).await.unwrap_err();
        assert!(matches!(err, ExtractError::Llm(LlmError::InvalidJson { .. })));
    }
}
