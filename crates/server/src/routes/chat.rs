use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chat::{PolicySummary, Selection};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The broker's question
    pub message: String,

    /// Customer whose policies are in scope
    pub customer_id: String,

    /// Policy selected earlier in the conversation, if any
    #[serde(default)]
    pub last_policy_id: Option<String>,
}

/// Answer a question about one of a customer's policies.
///
/// Selection first (auto for a single policy, model-driven otherwise); an
/// unclear selection returns a clarification question instead of an answer.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChatRequest>,
) -> ServerResult<impl IntoResponse> {
    // Only policies with stored extraction text can be asked about.
    let policies: Vec<_> = state
        .store
        .list_policies(Some(&request.customer_id))?
        .into_iter()
        .filter(|p| p.ocr_text.is_some())
        .collect();

    let summaries: Vec<PolicySummary> = policies
        .iter()
        .map(|p| PolicySummary {
            id: p.id.clone(),
            file_name: p.file_name.clone(),
            insurer: p.insurer.clone(),
            wording_version: p.wording_version.clone(),
        })
        .collect();

    let selection = chat::select_policy(
        &request.message,
        &summaries,
        request.last_policy_id.as_deref(),
        &state.llm_cfg,
    )
    .await?;

    let policy_id = match selection {
        Selection::NeedsClarification { question } => {
            return Ok(Json(json!({
                "clarification": true,
                "question": question,
            })));
        }
        Selection::Selected { policy_id } => policy_id,
    };

    let policy = state.store.policy(&policy_id)?;
    let context = format!(
        "File: {}\nInsurer: {}\nWording version: {}\n\n{}",
        policy.file_name.as_deref().unwrap_or("(unknown)"),
        policy.insurer.as_deref().unwrap_or("(unknown)"),
        policy.wording_version.as_deref().unwrap_or("(unknown)"),
        policy.ocr_text.as_deref().unwrap_or_default(),
    );

    let reply = chat::answer_question(&request.message, &context, &state.llm_cfg).await?;

    Ok(Json(json!({
        "clarification": false,
        "policy_id": policy_id,
        "reply": reply,
    })))
}
