//! Covercheck Upload Layer
//!
//! This is where policy documents enter the review pipeline. We take raw
//! content + metadata, run it through validation, and produce a clean
//! canonical record that the extraction and matching stages can handle.
//!
//! ## What we do here
//!
//! - **Validate and normalize metadata** - Check required fields (customer),
//!   apply defaults, strip out control characters nobody wants
//! - **Generate IDs** - If you don't provide a doc ID, we derive one using
//!   UUIDv5. Same input = same ID, every time.
//! - **Handle payloads** - Text or binary. Text gets whitespace normalized;
//!   binary (PDF schedules) is preserved for the extraction endpoint.
//! - **Enforce policies** - Reject future timestamps, limit attribute blob
//!   sizes, cap payload sizes.
//! - **Log everything** - Structured logs via tracing.
//!
//! ## Main entry point
//!
//! Call [`ingest`] with a [`RawUploadRecord`] and [`UploadConfig`], get back
//! a [`CanonicalUploadRecord`]. Errors are typed so you can actually handle
//! them.
//!
//! ## Example
//!
//! ```
//! use ingest::{ingest, UploadConfig, RawUploadRecord, UploadSource, UploadMetadata, UploadPayload};
//! use chrono::Utc;
//!
//! let config = UploadConfig::default();
//! let record = RawUploadRecord {
//!     id: "upload-1".into(),
//!     source: UploadSource::Portal,
//!     metadata: UploadMetadata {
//!         customer_id: Some("acme-brokers".into()),
//!         doc_id: None,
//!         received_at: Some(Utc::now()),
//!         original_source: None,
//!         attributes: None,
//!     },
//!     payload: Some(UploadPayload::Text("  Schedule text with   extra whitespace.  ".into())),
//! };
//!
//! let canonical = ingest(record, &config).unwrap();
//! assert_eq!(canonical.customer_id, "acme-brokers");
//! ```
use std::time::Instant;

use tracing::{info, warn, Level};

mod config;
mod error;
mod metadata;
mod payload;
mod types;

use crate::metadata::normalize_metadata;

pub use crate::config::{ConfigError, MetadataPolicy, RequiredField, UploadConfig};
pub use crate::error::UploadError;
pub use crate::payload::{
    normalize_payload_option, payload_kind, payload_length, validate_payload_requirements,
};
pub use crate::types::{
    CanonicalPayload, CanonicalUploadRecord, RawUploadRecord, UploadMetadata, UploadPayload,
    UploadSource,
};

/// Ingest a raw upload: validates metadata, normalizes the payload, and
/// returns a canonical record.
pub fn ingest(
    raw: RawUploadRecord,
    cfg: &UploadConfig,
) -> Result<CanonicalUploadRecord, UploadError> {
    let start = Instant::now();
    let RawUploadRecord {
        id,
        source,
        metadata,
        payload,
    } = raw;

    let customer_hint = metadata.customer_id.clone();
    let doc_hint = metadata.doc_id.clone();

    let record_id = match metadata::sanitize_required_field("id", id, cfg.strip_control_chars) {
        Ok(id) => id,
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "upload_failure");
            return Err(err);
        }
    };

    let span = tracing::span!(
        Level::INFO,
        "ingest.upload",
        record_id = %record_id,
        source = ?source
    );
    let _guard = span.enter();

    match ingest_inner(record_id, source, metadata, payload, cfg) {
        Ok(record) => {
            let elapsed_micros = start.elapsed().as_micros();
            info!(
                customer_id = %record.customer_id,
                doc_id = %record.doc_id,
                payload_kind = %payload_kind(record.normalized_payload.as_ref()),
                normalized_len = payload_length(record.normalized_payload.as_ref()),
                elapsed_micros,
                "upload_success"
            );
            Ok(record)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(
                customer_id = ?customer_hint,
                doc_id = ?doc_hint,
                error = %err,
                elapsed_micros,
                "upload_failure"
            );
            Err(err)
        }
    }
}

/// Core ingest logic: validates payload, normalizes metadata and payload.
fn ingest_inner(
    record_id: String,
    source: UploadSource,
    metadata: UploadMetadata,
    payload: Option<UploadPayload>,
    cfg: &UploadConfig,
) -> Result<CanonicalUploadRecord, UploadError> {
    // Some sources require a payload, so we check for that first.
    validate_payload_requirements(&source, &payload)?;

    // Reject oversized raw payloads before normalization.
    if let Some(limit) = cfg.max_payload_bytes {
        if let Some(ref p) = payload {
            let len = match p {
                UploadPayload::Text(s) => s.len(),
                UploadPayload::TextBytes(b) => b.len(),
                UploadPayload::Binary(b) => b.len(),
            };
            if len > limit {
                return Err(UploadError::PayloadTooLarge(format!(
                    "raw payload size {len} exceeds limit of {limit}"
                )));
            }
        }
    }

    let normalized_metadata = normalize_metadata(metadata, cfg, &record_id)?;
    let normalized_payload = normalize_payload_option(&source, payload, cfg)?;

    Ok(CanonicalUploadRecord {
        id: record_id,
        customer_id: normalized_metadata.customer_id,
        doc_id: normalized_metadata.doc_id,
        received_at: normalized_metadata.received_at,
        original_source: normalized_metadata.original_source,
        source,
        normalized_payload,
        attributes: normalized_metadata.attributes,
    })
}

/// Collapses repeated whitespace, trims edges, and normalizes newlines to
/// single ' '. Keeps content deterministic across runs.
pub fn normalize_payload(s: &str) -> String {
    let mut normalized = String::with_capacity(s.len());
    for segment in s.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, Utc};

    use super::*;

    fn fixed_timestamp() -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("invalid date components");
        let date_time = date.and_hms_opt(0, 0, 0).expect("invalid time components");
        DateTime::<Utc>::from_naive_utc_and_offset(date_time, Utc)
    }

    fn base_metadata() -> UploadMetadata {
        UploadMetadata {
            customer_id: Some("acme-brokers".into()),
            doc_id: Some("doc-123".into()),
            received_at: Some(fixed_timestamp()),
            original_source: None,
            attributes: None,
        }
    }

    #[test]
    fn test_normalize_payload() {
        let cases = [
            (
                "  Hello\n\n   world\t this  is\n a test  ",
                "Hello world this is a test",
            ),
            ("\n", ""),
            ("emoji \u{1f600} test ", "emoji \u{1f600} test"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_payload(input), expected);
        }
    }

    #[test]
    fn test_ingest_portal_success() {
        let record = RawUploadRecord {
            id: "upload-1".into(),
            source: UploadSource::Portal,
            metadata: base_metadata(),
            payload: Some(UploadPayload::Text(" Schedule   text \n ".into())),
        };

        let rec = ingest(record, &UploadConfig::default()).expect("ingest should succeed");
        assert_eq!(rec.customer_id, "acme-brokers");
        assert_eq!(rec.doc_id, "doc-123");
        match rec.normalized_payload {
            Some(CanonicalPayload::Text(text)) => assert_eq!(text, "Schedule text"),
            _ => panic!("expected text payload"),
        }
    }

    #[test]
    fn test_ingest_whitespace_only_rejected() {
        let record = RawUploadRecord {
            id: "upload-2".into(),
            source: UploadSource::Portal,
            metadata: base_metadata(),
            payload: Some(UploadPayload::Text("   ".into())),
        };

        let res = ingest(record, &UploadConfig::default());
        assert!(matches!(res, Err(UploadError::EmptyNormalizedText)));
    }

    #[test]
    fn test_ingest_missing_payload_for_file() {
        let record = RawUploadRecord {
            id: "upload-3".into(),
            source: UploadSource::File {
                filename: "schedule.pdf".into(),
                content_type: Some("application/pdf".into()),
            },
            metadata: base_metadata(),
            payload: None,
        };

        let res = ingest(record, &UploadConfig::default());
        assert!(matches!(res, Err(UploadError::MissingPayload)));
    }

    #[test]
    fn test_ingest_binary_preserved() {
        let payload = vec![0x25, 0x50, 0x44, 0x46]; // %PDF
        let record = RawUploadRecord {
            id: "upload-4".into(),
            source: UploadSource::File {
                filename: "schedule.pdf".into(),
                content_type: Some("application/pdf".into()),
            },
            metadata: base_metadata(),
            payload: Some(UploadPayload::Binary(payload.clone())),
        };

        let rec = ingest(record, &UploadConfig::default()).expect("ingest should succeed");
        assert_eq!(rec.binary_payload(), Some(payload.as_slice()));
        assert_eq!(rec.file_name(), Some("schedule.pdf"));
    }

    #[test]
    fn test_ingest_missing_customer_rejected() {
        let record = RawUploadRecord {
            id: "upload-5".into(),
            source: UploadSource::Portal,
            metadata: UploadMetadata {
                customer_id: None,
                ..base_metadata()
            },
            payload: Some(UploadPayload::Text("Schedule text".into())),
        };

        let res = ingest(record, &UploadConfig::default());
        assert!(matches!(res, Err(UploadError::InvalidMetadata(_))));
    }

    #[test]
    fn test_ingest_doc_id_derived_when_missing() {
        let record = RawUploadRecord {
            id: "upload-6".into(),
            source: UploadSource::Portal,
            metadata: UploadMetadata {
                doc_id: None,
                ..base_metadata()
            },
            payload: Some(UploadPayload::Text("Schedule text".into())),
        };

        let first = ingest(record.clone(), &UploadConfig::default()).unwrap();
        let second = ingest(record, &UploadConfig::default()).unwrap();
        assert!(!first.doc_id.is_empty());
        assert_eq!(first.doc_id, second.doc_id);
    }

    #[test]
    fn test_ingest_future_timestamp_rejected_when_configured() {
        let cfg = UploadConfig {
            metadata_policy: MetadataPolicy {
                reject_future_timestamps: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let record = RawUploadRecord {
            id: "upload-7".into(),
            source: UploadSource::Portal,
            metadata: UploadMetadata {
                received_at: Some(Utc::now() + Duration::hours(2)),
                ..base_metadata()
            },
            payload: Some(UploadPayload::Text("Schedule text".into())),
        };

        let res = ingest(record, &cfg);
        assert!(matches!(res, Err(UploadError::InvalidMetadata(_))));
    }

    #[test]
    fn test_ingest_raw_size_limit() {
        let cfg = UploadConfig {
            max_payload_bytes: Some(8),
            ..Default::default()
        };
        let record = RawUploadRecord {
            id: "upload-8".into(),
            source: UploadSource::Portal,
            metadata: base_metadata(),
            payload: Some(UploadPayload::Text("well beyond eight bytes".into())),
        };

        let res = ingest(record, &cfg);
        assert!(matches!(res, Err(UploadError::PayloadTooLarge(_))));
    }
}
