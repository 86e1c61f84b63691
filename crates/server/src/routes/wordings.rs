use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::WordingRecord;

/// Request to register a reference wording
#[derive(Debug, Deserialize)]
pub struct CreateWordingRequest {
    /// Insurer name as the operator knows it
    pub insurer: String,

    /// Wording version or reference
    pub wording_version: String,

    /// File name of the wording document, if one was uploaded
    #[serde(default)]
    pub file_name: Option<String>,

    /// Full wording body text
    pub wording_text: String,
}

/// Wording summary (body omitted; wordings run to hundreds of pages)
#[derive(Debug, Serialize)]
pub struct WordingSummary {
    pub id: String,
    pub insurer: String,
    pub wording_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub uploaded_at: String,
}

impl From<WordingRecord> for WordingSummary {
    fn from(record: WordingRecord) -> Self {
        Self {
            id: record.id,
            insurer: record.insurer,
            wording_version: record.wording_version,
            file_name: record.file_name,
            uploaded_at: record.uploaded_at.to_rfc3339(),
        }
    }
}

/// Register a wording record
pub async fn create_wording(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateWordingRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.insurer.trim().is_empty() {
        return Err(ServerError::BadRequest("insurer must not be empty".into()));
    }
    if request.wording_text.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "wording_text must not be empty".into(),
        ));
    }

    let mut record = WordingRecord::new(
        request.insurer.trim(),
        request.wording_version.trim(),
        request.wording_text,
    );
    record.file_name = request.file_name;
    state.store.insert_wording(&record)?;

    Ok(Json(WordingSummary::from(record)))
}

/// List wording records
pub async fn list_wordings(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let wordings: Vec<WordingSummary> = state
        .store
        .list_wordings()?
        .into_iter()
        .map(WordingSummary::from)
        .collect();

    Ok(Json(wordings))
}

/// Get a single wording, including its body text
pub async fn get_wording(
    State(state): State<Arc<ServerState>>,
    Path(wording_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let record = state.store.wording(&wording_id)?;
    Ok(Json(record))
}
