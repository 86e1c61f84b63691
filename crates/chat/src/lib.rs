//! Covercheck chat stage: answer a broker's question about one of a
//! customer's policies.
//!
//! Two steps, both deliberately narrow:
//!
//! 1. **Selection** — figure out which policy the question is about. One
//!    candidate auto-selects; a remembered `last_policy_id` wins if it is
//!    still in the candidate set; otherwise the model is asked to pick and
//!    must answer with the exact UUID (never an index). Anything unclear
//!    becomes an explicit [`Selection::NeedsClarification`].
//! 2. **Answering** — the question is answered against the selected
//!    policy's stored extraction text only; the model is told not to reach
//!    beyond it.

use llm::{complete, parse_json_output, CompletionRequest, LlmConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by the chat stage.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),

    /// The customer has no policies to ask about.
    #[error("no policies available for selection")]
    NoPolicies,

    /// The question was empty.
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Candidate policy offered to the selection step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicySummary {
    pub id: String,
    pub file_name: Option<String>,
    pub insurer: Option<String>,
    pub wording_version: Option<String>,
}

/// Outcome of the selection step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum Selection {
    /// Exactly one policy identified.
    Selected { policy_id: String },
    /// The model (or the candidate set) could not identify one; ask the
    /// broker and retry with their answer.
    NeedsClarification { question: String },
}

const DEFAULT_CLARIFICATION: &str = "Which policy are you asking about?";

/// Decide which policy a question refers to.
pub async fn select_policy(
    message: &str,
    policies: &[PolicySummary],
    last_policy_id: Option<&str>,
    cfg: &LlmConfig,
) -> Result<Selection, ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    if policies.is_empty() {
        return Err(ChatError::NoPolicies);
    }

    // A remembered selection wins as long as it is still a candidate.
    if let Some(last) = last_policy_id {
        if policies.iter().any(|p| p.id == last) {
            debug!(policy_id = last, "reusing previous policy selection");
            return Ok(Selection::Selected {
                policy_id: last.to_string(),
            });
        }
    }

    // Only one policy: nothing to disambiguate.
    if policies.len() == 1 {
        info!(policy_id = %policies[0].id, "single policy auto-selected");
        return Ok(Selection::Selected {
            policy_id: policies[0].id.clone(),
        });
    }

    let completion = complete(
        CompletionRequest::new("chat-select", selection_prompt(message, policies))
            .with_max_output_tokens(100),
        cfg,
    )
    .await?;

    let Ok(value) = parse_json_output(&completion.output_text) else {
        // Unparseable selection output is treated as "unclear", not an error.
        return Ok(Selection::NeedsClarification {
            question: DEFAULT_CLARIFICATION.to_string(),
        });
    };

    let needs_clarification = value
        .get("needs_clarification")
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);
    let policy_id = value
        .get("policyId")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    match (needs_clarification, policy_id) {
        (false, Some(id)) if policies.iter().any(|p| p.id == id) => {
            Ok(Selection::Selected { policy_id: id })
        }
        _ => {
            let question = value
                .get("clarification_question")
                .and_then(JsonValue::as_str)
                .unwrap_or(DEFAULT_CLARIFICATION)
                .to_string();
            Ok(Selection::NeedsClarification { question })
        }
    }
}

fn selection_prompt(message: &str, policies: &[PolicySummary]) -> String {
    let mut listing = String::new();
    for (i, p) in policies.iter().enumerate() {
        listing.push_str(&format!(
            "Policy {}:\nUUID=\"{}\"\nFile=\"{}\"\nInsurer=\"{}\"\nVersion=\"{}\"\n\n",
            i + 1,
            p.id,
            p.file_name.as_deref().unwrap_or(""),
            p.insurer.as_deref().unwrap_or(""),
            p.wording_version.as_deref().unwrap_or(""),
        ));
    }

    format!(
        "A customer asked: \"{message}\"\n\n\
         Here are the available policies (each includes its TRUE UUID):\n\n\
         {listing}\
         RULES:\n\
         - ALWAYS return the exact UUID field shown above.\n\
         - NEVER return the index number (1, 2, etc.).\n\
         - NEVER return \"#1\", \"Policy 1\", or anything except the UUID string.\n\n\
         Return ONLY one JSON object:\n\n\
         If clear:\n\
         {{ \"policyId\": \"<UUID>\", \"needs_clarification\": false }}\n\n\
         If unclear:\n\
         {{ \"policyId\": null, \"needs_clarification\": true,\n\
           \"clarification_question\": \"Which policy are you asking about?\" }}"
    )
}

/// Answer a question against a single policy's stored extraction text.
pub async fn answer_question(
    message: &str,
    policy_context: &str,
    cfg: &LlmConfig,
) -> Result<String, ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let prompt = format!(
        "You are an insurance assistant for a broker. Answer the question \
         using ONLY the policy information below. If the answer is not in \
         the policy information, say so plainly; never guess.\n\n\
         ---------------- POLICY ----------------\n{policy_context}\n\n\
         ---------------- QUESTION ----------------\n{message}"
    );

    let completion = complete(CompletionRequest::new("chat-answer", prompt), cfg).await?;
    Ok(completion.output_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, insurer: &str) -> PolicySummary {
        PolicySummary {
            id: id.to_string(),
            file_name: Some(format!("{insurer}.pdf")),
            insurer: Some(insurer.to_string()),
            wording_version: Some("11.20".into()),
        }
    }

    #[tokio::test]
    async fn single_policy_auto_selects() {
        let cfg = LlmConfig::stub();
        let policies = vec![summary("p-1", "DUAL")];

        let selection = select_policy("what is my excess?", &policies, None, &cfg)
            .await
            .unwrap();
        assert_eq!(
            selection,
            Selection::Selected {
                policy_id: "p-1".into()
            }
        );
    }

    #[tokio::test]
    async fn last_policy_id_wins_when_still_present() {
        let cfg = LlmConfig::stub();
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("and the deductible?", &policies, Some("p-2"), &cfg)
            .await
            .unwrap();
        assert_eq!(
            selection,
            Selection::Selected {
                policy_id: "p-2".into()
            }
        );
    }

    #[tokio::test]
    async fn stale_last_policy_id_is_ignored() {
        // Selection falls through to the model; the canned output picks p-1.
        let cfg = LlmConfig::stub_with_output(
            r#"{"policyId": "p-1", "needs_clarification": false}"#,
        );
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("what is covered?", &policies, Some("p-9"), &cfg)
            .await
            .unwrap();
        assert_eq!(
            selection,
            Selection::Selected {
                policy_id: "p-1".into()
            }
        );
    }

    #[tokio::test]
    async fn model_selection_returns_uuid() {
        let cfg = LlmConfig::stub_with_output(
            r#"{"policyId": "p-2", "needs_clarification": false}"#,
        );
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("the Chubb one", &policies, None, &cfg)
            .await
            .unwrap();
        assert_eq!(
            selection,
            Selection::Selected {
                policy_id: "p-2".into()
            }
        );
    }

    #[tokio::test]
    async fn unknown_uuid_becomes_clarification() {
        // The model returned an id that isn't in the candidate set.
        let cfg = LlmConfig::stub_with_output(
            r#"{"policyId": "p-99", "needs_clarification": false}"#,
        );
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("my policy", &policies, None, &cfg).await.unwrap();
        assert!(matches!(selection, Selection::NeedsClarification { .. }));
    }

    #[tokio::test]
    async fn model_clarification_question_is_surfaced() {
        let cfg = LlmConfig::stub_with_output(
            r#"{"policyId": null, "needs_clarification": true, "clarification_question": "Do you mean the property or the liability policy?"}"#,
        );
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("my policy", &policies, None, &cfg).await.unwrap();
        assert_eq!(
            selection,
            Selection::NeedsClarification {
                question: "Do you mean the property or the liability policy?".into()
            }
        );
    }

    #[tokio::test]
    async fn unparseable_selection_becomes_clarification() {
        let cfg = LlmConfig::stub_with_output("Policy 1 looks right to me!");
        let policies = vec![summary("p-1", "DUAL"), summary("p-2", "Chubb")];

        let selection = select_policy("my policy", &policies, None, &cfg).await.unwrap();
        assert!(matches!(selection, Selection::NeedsClarification { .. }));
    }

    #[tokio::test]
    async fn no_policies_is_an_error() {
        let cfg = LlmConfig::stub();
        let err = select_policy("anything", &[], None, &cfg).await.unwrap_err();
        assert!(matches!(err, ChatError::NoPolicies));
    }

    #[tokio::test]
    async fn answer_uses_the_model_output() {
        let cfg = LlmConfig::stub_with_output("Your excess is $500.");
        let reply = answer_question("what is my excess?", "excess: $500", &cfg)
            .await
            .unwrap();
        assert_eq!(reply, "Your excess is $500.");
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let cfg = LlmConfig::stub();
        let err = answer_question("  ", "context", &cfg).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }
}
