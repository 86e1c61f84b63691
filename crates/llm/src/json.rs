//! Recovery helpers for model output that is supposed to be JSON.
//!
//! Models asked for "STRICT JSON" still wrap their answers in Markdown code
//! fences often enough that every parse site needs the same cleanup pass.

use serde_json::Value;

use crate::error::LlmError;

/// Strips Markdown code fences (```json ... ```) and surrounding whitespace
/// from model output.
pub fn clean_json_output(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();

    // Fences appear with and without the language tag, in any case.
    for fence in ["```json", "```JSON", "```Json"] {
        while let Some(pos) = cleaned.find(fence) {
            cleaned.replace_range(pos..pos + fence.len(), "");
        }
    }
    cleaned = cleaned.replace("```", "");

    cleaned.trim().to_string()
}

/// Cleans fences then parses the output as a JSON value.
///
/// On failure the error carries the raw output so operators can inspect what
/// the model actually returned.
pub fn parse_json_output(raw: &str) -> Result<Value, LlmError> {
    let cleaned = clean_json_output(raw);
    serde_json::from_str(&cleaned).map_err(|err| LlmError::InvalidJson {
        message: err.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"insurer\": \"DUAL\"}\n```";
        assert_eq!(clean_json_output(raw), "{\"insurer\": \"DUAL\"}");
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        let raw = "  ```\n{\"a\": 1}\n```  ";
        assert_eq!(clean_json_output(raw), "{\"a\": 1}");
    }

    #[test]
    fn passes_clean_output_through() {
        let raw = "{\"a\": 1}";
        assert_eq!(clean_json_output(raw), raw);
    }

    #[test]
    fn parse_returns_value() {
        let value = parse_json_output("```json\n{\"insurer\": \"DUAL\"}\n```").unwrap();
        assert_eq!(value["insurer"], "DUAL");
    }

    #[test]
    fn parse_failure_carries_raw_output() {
        let err = parse_json_output("the model apologises instead of answering").unwrap_err();
        match err {
            LlmError::InvalidJson { raw, .. } => {
                assert!(raw.contains("apologises"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
