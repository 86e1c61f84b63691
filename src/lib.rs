//! Workspace umbrella crate for Covercheck, the policy wording review
//! pipeline.
//!
//! This crate stitches the pipeline stages together so callers can operate
//! over uploads with a single API entry point:
//!
//! - [`process_upload_with_configs`]: upload validation → document
//!   extraction → metadata field mapping, one call.
//! - [`match_policy`]: adapt stored wording records into matcher candidates
//!   and run the insurer/version matching engine.
//!
//! The HTTP surface lives in the `covercheck-server` crate; the stages
//! themselves live in the `policy-*` crates re-exported below.

pub use chat::{ChatError, PolicySummary, Selection};
pub use compare::{CompareError, ComparisonReport, EndorsementDifference, SectionComparison};
pub use extract::{DocumentContent, ExtractError, ExtractedFields, ExtractionResult};
pub use ingest::{
    ingest, CanonicalPayload, CanonicalUploadRecord, RawUploadRecord, UploadConfig, UploadError,
    UploadMetadata, UploadPayload, UploadSource,
};
pub use llm::{clean_json_output, Completion, CompletionRequest, LlmConfig, LlmError};
pub use matcher::{
    match_wording, normalize_insurer, MatchError, MatchOutcome, MatchQuery, WordingCandidate,
};
pub use store::{
    AnalysisRecord, BackendConfig, CustomerRecord, PolicyRecord, PolicyStatus, PolicyStore,
    StoreError, WordingRecord,
};

mod config;
pub use config::{ConfigLoadError, CovercheckConfig, StoreSection};

use thiserror::Error;

/// Errors that can occur while processing an upload through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("upload failure: {0}")]
    Upload(#[from] UploadError),

    #[error("extraction failure: {0}")]
    Extract(#[from] ExtractError),

    /// The upload carried no payload to extract from (metadata-only event).
    #[error("upload has no document payload to extract from")]
    NonDocumentPayload,
}

/// Result of running an upload through validation and document extraction.
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    /// The canonical upload record (sanitized metadata, normalized payload).
    pub record: CanonicalUploadRecord,
    /// The typed extraction result.
    pub extraction: ExtractionResult,
    /// Flattened extraction text, stored as the policy's `ocr_text`.
    pub ocr_text: String,
    /// Insurer the document metadata already carried, if any.
    pub insurer: Option<String>,
    /// Wording version the document metadata already carried, if any.
    pub wording_version: Option<String>,
}

/// Process a raw upload end-to-end with explicit configuration: validate
/// and normalize, then run document extraction over the payload.
pub async fn process_upload_with_configs(
    raw: RawUploadRecord,
    upload_cfg: &UploadConfig,
    llm_cfg: &LlmConfig,
) -> Result<ProcessedUpload, PipelineError> {
    let record = ingest(raw, upload_cfg)?;

    let extraction = {
        let content = match &record.normalized_payload {
            Some(CanonicalPayload::Text(text)) => DocumentContent::Text(text.as_str()),
            Some(CanonicalPayload::Binary(bytes)) => DocumentContent::Binary {
                file_name: record.file_name().unwrap_or("document"),
                bytes: bytes.as_slice(),
            },
            None => return Err(PipelineError::NonDocumentPayload),
            Some(_) => unreachable!("unknown CanonicalPayload variant"),
        };
        extract::extract_document(content, llm_cfg).await?
    };

    let ocr_text = extraction.flattened_text();
    let insurer = extraction.metadata_insurer();
    let wording_version = extraction.metadata_wording_version();
    tracing::debug!(
        doc_id = %record.doc_id,
        structured = matches!(extraction, ExtractionResult::Structured { .. }),
        has_insurer = insurer.is_some(),
        "upload processed"
    );

    Ok(ProcessedUpload {
        record,
        extraction,
        ocr_text,
        insurer,
        wording_version,
    })
}

/// Run the matching engine over stored wording records.
///
/// Adapts [`WordingRecord`]s into matcher candidates (id, insurer, version,
/// file name) and delegates to [`match_wording`]. Candidate order is the
/// store's stable id order, though the outcome never depends on it.
pub fn match_policy(
    insurer: &str,
    wording_version: &str,
    wordings: &[WordingRecord],
) -> Result<MatchOutcome, MatchError> {
    let candidates: Vec<WordingCandidate> = wordings
        .iter()
        .map(|w| WordingCandidate {
            id: w.id.clone(),
            insurer: w.insurer.clone(),
            wording_version: w.wording_version.clone(),
            file_name: w.file_name.clone(),
        })
        .collect();

    let query = MatchQuery {
        insurer: insurer.to_string(),
        wording_version: wording_version.to_string(),
    };
    match_wording(&query, &candidates)
}
