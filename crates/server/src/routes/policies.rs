use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine as _;
use ingest::{RawUploadRecord, UploadMetadata, UploadPayload, UploadSource};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use store::PolicyRecord;

/// Request to upload a policy document
#[derive(Debug, Deserialize)]
pub struct UploadPolicyRequest {
    /// Customer the policy belongs to
    pub customer_id: String,

    /// Original file name (present for file uploads)
    #[serde(default)]
    pub file_name: Option<String>,

    /// MIME type of the uploaded document
    #[serde(default)]
    pub content_type: Option<String>,

    /// Document text (portal paste / pre-extracted text)
    #[serde(default)]
    pub content_text: Option<String>,

    /// Document bytes, base64-encoded (PDF schedules)
    #[serde(default)]
    pub content_base64: Option<String>,

    /// Operator-preselected wording, skipping the matcher
    #[serde(default)]
    pub wording_id: Option<String>,
}

/// Policy summary returned by list endpoints
#[derive(Debug, Serialize)]
pub struct PolicySummary {
    pub id: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub status: store::PolicyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wording_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wording_id: Option<String>,
    pub received_at: String,
}

impl From<&PolicyRecord> for PolicySummary {
    fn from(record: &PolicyRecord) -> Self {
        Self {
            id: record.id.clone(),
            customer_id: record.customer_id.clone(),
            file_name: record.file_name.clone(),
            status: record.status,
            insurer: record.insurer.clone(),
            wording_version: record.wording_version.clone(),
            wording_id: record.wording_id.clone(),
            received_at: record.received_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing policies
#[derive(Debug, Deserialize)]
pub struct ListPoliciesQuery {
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// Upload a policy document: validate, run document extraction, store.
///
/// The policy lands in `uploaded` state with its extraction payload and any
/// insurer/version values the document metadata already carried.
pub async fn upload_policy(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<UploadPolicyRequest>,
) -> ServerResult<impl IntoResponse> {
    let payload = match (&request.content_base64, &request.content_text) {
        (Some(encoded), _) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|err| ServerError::BadRequest(format!("invalid base64 content: {err}")))?;
            UploadPayload::Binary(bytes)
        }
        (None, Some(text)) => UploadPayload::Text(text.clone()),
        (None, None) => {
            return Err(ServerError::BadRequest(
                "content_text or content_base64 is required".into(),
            ));
        }
    };

    let source = match &request.file_name {
        Some(file_name) => UploadSource::File {
            filename: file_name.clone(),
            content_type: request.content_type.clone(),
        },
        None => UploadSource::Portal,
    };

    let raw = RawUploadRecord {
        id: uuid::Uuid::new_v4().to_string(),
        source,
        metadata: UploadMetadata {
            customer_id: Some(request.customer_id.clone()),
            doc_id: None,
            received_at: None,
            original_source: None,
            attributes: None,
        },
        payload: Some(payload),
    };

    let processed =
        covercheck::process_upload_with_configs(raw, &state.upload_cfg, &state.llm_cfg).await?;

    let mut policy = PolicyRecord::new(processed.record.doc_id.clone(), request.customer_id);
    policy.file_name = request.file_name;
    policy.content_type = request.content_type;
    policy.received_at = processed.record.received_at;
    policy.extraction = Some(serde_json::to_value(&processed.extraction)?);
    policy.ocr_text = Some(processed.ocr_text);
    policy.insurer = processed.insurer;
    policy.wording_version = processed.wording_version;
    policy.wording_id = request.wording_id;
    state.store.insert_policy(&policy)?;

    Ok(Json(json!({
        "success": true,
        "policy": PolicySummary::from(&policy),
        "extracted": processed.extraction,
    })))
}

/// List policies, optionally filtered by customer
pub async fn list_policies(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListPoliciesQuery>,
) -> ServerResult<impl IntoResponse> {
    let policies = state.store.list_policies(query.customer_id.as_deref())?;
    let summaries: Vec<PolicySummary> = policies.iter().map(PolicySummary::from).collect();
    Ok(Json(summaries))
}

/// Get a single policy, including its stored extraction
pub async fn get_policy(
    State(state): State<Arc<ServerState>>,
    Path(policy_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let policy = state.store.policy(&policy_id)?;
    Ok(Json(policy))
}

/// Run field extraction over the stored document text and advance the
/// policy to `extracted`.
pub async fn extract_policy(
    State(state): State<Arc<ServerState>>,
    Path(policy_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let policy = state.store.policy(&policy_id)?;
    let ocr_text = policy.ocr_text.as_deref().ok_or_else(|| {
        ServerError::BadRequest("Policy has no extracted text to read fields from".into())
    })?;

    let fields = extract::extract_fields(ocr_text, &state.llm_cfg).await?;
    let updated = state
        .store
        .record_fields(&policy_id, &fields.insurer, &fields.wording_version)?;

    Ok(Json(json!({
        "success": true,
        "policy": PolicySummary::from(&updated),
        "extracted": fields,
    })))
}

/// Run the insurer/version matcher against the full wording candidate set.
///
/// A unique match is persisted and advances the policy to `matched`. A
/// no-match answers 404 and an ambiguous match answers 409, both carrying
/// the full diagnostic outcome; neither changes the policy.
pub async fn match_policy(
    State(state): State<Arc<ServerState>>,
    Path(policy_id): Path<String>,
) -> ServerResult<Response> {
    let policy = state.store.policy(&policy_id)?;

    let insurer = policy.insurer.as_deref().ok_or_else(|| {
        ServerError::Validation("policy has no insurer; run extraction first".into())
    })?;
    let wording_version = policy.wording_version.as_deref().ok_or_else(|| {
        ServerError::Validation("policy has no wording_version; run extraction first".into())
    })?;

    let wordings = state.store.list_wordings()?;
    let outcome = covercheck::match_policy(insurer, wording_version, &wordings)?;

    match outcome {
        matcher::MatchOutcome::Matched { ref wording_id } => {
            let updated = state.store.record_match(&policy_id, wording_id)?;
            Ok(Json(json!({
                "success": true,
                "policy": PolicySummary::from(&updated),
            }))
            .into_response())
        }
        matcher::MatchOutcome::NoMatch { .. } => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "No matching wording found",
                "outcome": outcome,
            })),
        )
            .into_response()),
        matcher::MatchOutcome::Ambiguous { .. } => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Multiple wordings satisfy the match conditions",
                "outcome": outcome,
            })),
        )
            .into_response()),
    }
}

/// Compare the policy schedule against its matched wording and record the
/// analysis.
pub async fn compare_policy(
    State(state): State<Arc<ServerState>>,
    Path(policy_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let policy = state.store.policy(&policy_id)?;

    let ocr_text = policy
        .ocr_text
        .as_deref()
        .ok_or_else(|| ServerError::BadRequest("Policy has no extracted text".into()))?;
    let wording_id = policy
        .wording_id
        .as_deref()
        .ok_or_else(|| ServerError::BadRequest("Policy has no matched wording".into()))?;

    let wording = state.store.wording(wording_id)?;
    if wording.wording_text.trim().is_empty() {
        return Err(ServerError::BadRequest("Wording text missing".into()));
    }

    let report = compare::compare_policy(
        ocr_text,
        &wording.wording_text,
        compare::DEFAULT_TEXT_CAP,
        &state.llm_cfg,
    )
    .await?;

    let analysis = state
        .store
        .record_analysis(&policy_id, serde_json::to_value(&report)?)?;

    Ok(Json(json!({
        "success": true,
        "analysis_id": analysis.id,
        "analysis": report,
    })))
}

/// List the analyses recorded for a policy, oldest first
pub async fn get_analyses(
    State(state): State<Arc<ServerState>>,
    Path(policy_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    // 404 for unknown policies rather than an empty list.
    let _ = state.store.policy(&policy_id)?;
    let analyses = state.store.analyses_for_policy(&policy_id)?;
    Ok(Json(analyses))
}
