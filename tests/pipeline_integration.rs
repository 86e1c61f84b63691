//! End-to-end pipeline tests over the stub completion client: upload →
//! document extraction → field extraction → matching → comparison, with the
//! store enforcing the lifecycle in between.

use covercheck::{
    process_upload_with_configs, CanonicalPayload, ExtractionResult, LlmConfig, MatchOutcome,
    PolicyRecord, PolicyStatus, PolicyStore, RawUploadRecord, UploadConfig, UploadMetadata,
    UploadPayload, UploadSource, WordingRecord,
};

fn upload_record(id: &str, text: &str) -> RawUploadRecord {
    RawUploadRecord {
        id: id.to_string(),
        source: UploadSource::File {
            filename: "schedule.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
        },
        metadata: UploadMetadata {
            customer_id: Some("acme-brokers".to_string()),
            doc_id: None,
            received_at: None,
            original_source: None,
            attributes: None,
        },
        payload: Some(UploadPayload::Text(text.to_string())),
    }
}

fn seeded_store() -> PolicyStore {
    let store = PolicyStore::in_memory();

    let mut dual = WordingRecord::new(
        "DUAL Australia Pty Limited",
        "11.20",
        "DUAL wording body text",
    );
    dual.id = "w-dual".to_string();
    dual.file_name = Some("DUAL-Wording-11.20.pdf".to_string());
    store.insert_wording(&dual).unwrap();

    let mut chubb = WordingRecord::new("Chubb Insurance Australia", "3.0", "Chubb wording body");
    chubb.id = "w-chubb".to_string();
    store.insert_wording(&chubb).unwrap();

    store
}

#[tokio::test]
async fn structured_upload_carries_metadata_fields() {
    let canned = r#"{
        "tables": {"limits": {"property": "$1,000,000"}},
        "text": "Policy schedule for Acme.",
        "metadata": {"insurer": "DUAL Australia Pty Limited", "wording_version": "11.20"}
    }"#;
    let llm_cfg = LlmConfig::stub_with_output(canned);

    let processed = process_upload_with_configs(
        upload_record("upload-1", "schedule body text"),
        &UploadConfig::default(),
        &llm_cfg,
    )
    .await
    .unwrap();

    assert!(matches!(
        processed.extraction,
        ExtractionResult::Structured { .. }
    ));
    assert_eq!(
        processed.insurer.as_deref(),
        Some("DUAL Australia Pty Limited")
    );
    assert_eq!(processed.wording_version.as_deref(), Some("11.20"));
    assert!(processed.ocr_text.contains("$1,000,000"));
    assert_eq!(processed.record.customer_id, "acme-brokers");
    assert!(matches!(
        processed.record.normalized_payload,
        Some(CanonicalPayload::Text(_))
    ));
}

#[tokio::test]
async fn full_review_lifecycle() {
    let store = seeded_store();

    // Upload: document extraction already carries the metadata fields.
    let canned = r#"{
        "tables": {},
        "text": "Policy schedule.",
        "metadata": {"insurer": "DUAL Australia Pty Limited", "wording_version": "11.20"}
    }"#;
    let llm_cfg = LlmConfig::stub_with_output(canned);
    let processed = process_upload_with_configs(
        upload_record("upload-1", "schedule body"),
        &UploadConfig::default(),
        &llm_cfg,
    )
    .await
    .unwrap();

    let mut policy = PolicyRecord::new(processed.record.doc_id.clone(), "acme-brokers");
    policy.file_name = Some("schedule.pdf".to_string());
    policy.extraction = Some(serde_json::to_value(&processed.extraction).unwrap());
    policy.ocr_text = Some(processed.ocr_text.clone());
    policy.insurer = processed.insurer.clone();
    policy.wording_version = processed.wording_version.clone();
    store.insert_policy(&policy).unwrap();
    assert_eq!(policy.status, PolicyStatus::Uploaded);

    // Field extraction confirms the fields and advances the lifecycle.
    let fields_cfg = LlmConfig::stub_with_output(
        r#"{"insurer": "DUAL Australia Pty Limited", "wording_version": "11.20"}"#,
    );
    let fields = extract::extract_fields(&processed.ocr_text, &fields_cfg)
        .await
        .unwrap();
    let policy = store
        .record_fields(&policy.id, &fields.insurer, &fields.wording_version)
        .unwrap();
    assert_eq!(policy.status, PolicyStatus::Extracted);

    // Matching resolves to the DUAL wording.
    let wordings = store.list_wordings().unwrap();
    let outcome = covercheck::match_policy(
        policy.insurer.as_deref().unwrap(),
        policy.wording_version.as_deref().unwrap(),
        &wordings,
    )
    .unwrap();
    let wording_id = match outcome {
        MatchOutcome::Matched { wording_id } => wording_id,
        other => panic!("expected a match, got {other:?}"),
    };
    assert_eq!(wording_id, "w-dual");
    let policy = store.record_match(&policy.id, &wording_id).unwrap();
    assert_eq!(policy.status, PolicyStatus::Matched);

    // Comparison produces a report that is stored as an analysis.
    let report_cfg = LlmConfig::stub_with_output(
        r#"{
            "sections": [{"name": "Property", "schedule_limit": "$1,000,000", "wording_limit": "$1,000,000", "match": true, "notes": "Limits agree."}],
            "missing_sections": [],
            "endorsement_differences": [],
            "overall_risk_summary": "Schedule aligns with the wording."
        }"#,
    );
    let wording = store.wording(&wording_id).unwrap();
    let report = compare::compare_policy(
        &processed.ocr_text,
        &wording.wording_text,
        compare::DEFAULT_TEXT_CAP,
        &report_cfg,
    )
    .await
    .unwrap();
    assert_eq!(report.sections.len(), 1);

    let analysis = store
        .record_analysis(&policy.id, serde_json::to_value(&report).unwrap())
        .unwrap();
    assert_eq!(analysis.policy_id, policy.id);
    assert_eq!(
        store.policy(&policy.id).unwrap().status,
        PolicyStatus::Compared
    );
}

#[tokio::test]
async fn chat_selects_and_answers_over_stored_policies() {
    let store = seeded_store();

    let mut policy = PolicyRecord::new("p-1", "acme-brokers");
    policy.file_name = Some("dual-schedule.pdf".to_string());
    policy.insurer = Some("DUAL Australia".to_string());
    policy.wording_version = Some("11.20".to_string());
    policy.extraction = Some(serde_json::json!({"kind": "plain_text", "text": "excess: $500"}));
    policy.ocr_text = Some("excess: $500".to_string());
    store.insert_policy(&policy).unwrap();

    let summaries = vec![chat::PolicySummary {
        id: policy.id.clone(),
        file_name: policy.file_name.clone(),
        insurer: policy.insurer.clone(),
        wording_version: policy.wording_version.clone(),
    }];

    // A single policy auto-selects without touching the model.
    let selection = chat::select_policy(
        "what is my excess?",
        &summaries,
        None,
        &LlmConfig::stub(),
    )
    .await
    .unwrap();
    assert_eq!(
        selection,
        chat::Selection::Selected {
            policy_id: "p-1".to_string()
        }
    );

    let answer_cfg = LlmConfig::stub_with_output("Your excess is $500.");
    let reply = chat::answer_question(
        "what is my excess?",
        store.policy("p-1").unwrap().ocr_text.as_deref().unwrap(),
        &answer_cfg,
    )
    .await
    .unwrap();
    assert_eq!(reply, "Your excess is $500.");
}
