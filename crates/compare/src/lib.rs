//! Covercheck comparison stage: schedule (extracted JSON/text) against the
//! matched wording (full legal text).
//!
//! The model is prompted with both documents, each capped at a byte budget
//! so a long wording cannot blow the context, and must answer in the exact
//! [`ComparisonReport`] schema. Values from the schedule are copied
//! verbatim; the model is told never to invent limits.

mod types;

pub use types::{ComparisonReport, EndorsementDifference, SectionComparison};

use llm::{complete, parse_json_output, CompletionRequest, LlmConfig};
use thiserror::Error;
use tracing::info;

/// Per-side byte cap applied to the schedule and wording texts before they
/// are embedded in the prompt.
pub const DEFAULT_TEXT_CAP: usize = 20_000;

/// Errors surfaced by the comparison stage.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("comparison input missing: {0}")]
    MissingInput(&'static str),
}

const COMPARE_PROMPT_HEADER: &str = "\
You are a senior insurance analyst. Compare an INSURANCE POLICY SCHEDULE \
(structured JSON) with the POLICY WORDING (full legal text).

You MUST return STRICT JSON in this exact schema:

{
  \"sections\": [
    {
      \"name\": \"string\",
      \"schedule_limit\": \"string or null\",
      \"wording_limit\": \"string or null\",
      \"match\": true/false,
      \"notes\": \"short plain-English explanation\"
    }
  ],
  \"missing_sections\": [\"string\"],
  \"endorsement_differences\": [
    {
      \"endorsement\": \"string\",
      \"in_schedule\": true/false,
      \"in_wording\": true/false
    }
  ],
  \"overall_risk_summary\": \"1-2 sentences.\"
}

RULES:
- Use the schedule JSON to extract LIMITS, DEDUCTIBLES, SUBLIMITS.
- Use the wording text to determine what is actually covered or excluded.
- NEVER invent limits. If wording has no limit, set \"wording_limit\": null.
- NEVER output explanations outside the JSON.
- NEVER modify or simplify numbers. Copy schedule values exactly.
- Be strict, precise, and concise.";

/// Compare a policy schedule against a wording.
///
/// `schedule_text` is the policy's stored extraction text; `wording_text`
/// is the full wording body. Both are capped at `text_cap` bytes (use
/// [`DEFAULT_TEXT_CAP`] unless the model tier says otherwise).
pub async fn compare_policy(
    schedule_text: &str,
    wording_text: &str,
    text_cap: usize,
    cfg: &LlmConfig,
) -> Result<ComparisonReport, CompareError> {
    if schedule_text.trim().is_empty() {
        return Err(CompareError::MissingInput("schedule text"));
    }
    if wording_text.trim().is_empty() {
        return Err(CompareError::MissingInput("wording text"));
    }

    let schedule = truncate_utf8(schedule_text, text_cap);
    let wording = truncate_utf8(wording_text, text_cap);
    info!(
        schedule_len = schedule.len(),
        wording_len = wording.len(),
        "running comparison"
    );

    let prompt = format!(
        "{COMPARE_PROMPT_HEADER}\n\n\
         ---------------- SCHEDULE_JSON ----------------\n{schedule}\n\n\
         ---------------- WORDING_TEXT ----------------\n{wording}\n\n\
         NOW RETURN ONLY THE JSON."
    );

    let completion = complete(
        CompletionRequest::new("compare-policy", prompt).with_comparison_model(),
        cfg,
    )
    .await?;

    let value = parse_json_output(&completion.output_text)?;
    let report = serde_json::from_value(value).map_err(|err| {
        CompareError::Llm(llm::LlmError::InvalidJson {
            message: err.to_string(),
            raw: completion.output_text.clone(),
        })
    })?;
    Ok(report)
}

/// Truncate to at most `cap` bytes without splitting a UTF-8 character.
fn truncate_utf8(text: &str, cap: usize) -> &str {
    if text.len() <= cap {
        return text;
    }
    let mut end = cap;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
