//! Covercheck record store.
//!
//! Typed records (policies, wordings, customers, analyses) over a pluggable
//! key-value backend: in-memory for tests, redb for deployments. The store
//! is also where the policy lifecycle invariants live:
//!
//! - status only moves forward (`uploaded → extracted → matched → compared`)
//! - a policy can only become `matched` once insurer and wording-version
//!   fields are populated, and the wording reference is set exactly once
//! - a comparison can only be recorded against a matched policy
//!
//! Candidate sets are small (tens of wordings, not millions), so
//! [`PolicyStore::list_wordings`] is a full prefix scan with no index.

mod backend;
mod error;
mod records;

pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use error::StoreError;
pub use records::{
    AnalysisRecord, CustomerRecord, PolicyRecord, PolicyStatus, WordingRecord,
    STORE_SCHEMA_VERSION,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::info;

/// Typed store over a [`StoreBackend`].
pub struct PolicyStore {
    backend: Box<dyn StoreBackend>,
}

impl PolicyStore {
    /// Open a store over the configured backend.
    pub fn open(config: &BackendConfig) -> Result<Self, StoreError> {
        Ok(Self {
            backend: config.build()?,
        })
    }

    /// In-memory store for tests and ephemeral use.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(InMemoryBackend::new()),
        }
    }

    fn put_record<T: Serialize>(&self, kind: &str, id: &str, record: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        self.backend.put(&format!("{kind}/{id}"), &bytes)
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        id: &str,
    ) -> Result<T, StoreError> {
        let bytes = self
            .backend
            .get(&format!("{kind}/{id}"))?
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn list_records<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, StoreError> {
        let mut records = Vec::new();
        self.backend
            .scan_prefix(&format!("{kind}/"), &mut |_key, value| {
                records.push(serde_json::from_slice(value)?);
                Ok(())
            })?;
        Ok(records)
    }

    // ---- customers ----

    pub fn insert_customer(&self, record: &CustomerRecord) -> Result<(), StoreError> {
        self.put_record("customer", &record.id, record)
    }

    pub fn customer(&self, id: &str) -> Result<CustomerRecord, StoreError> {
        self.get_record("customer", id)
    }

    pub fn list_customers(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        self.list_records("customer")
    }

    // ---- wordings ----

    pub fn insert_wording(&self, record: &WordingRecord) -> Result<(), StoreError> {
        self.put_record("wording", &record.id, record)
    }

    pub fn wording(&self, id: &str) -> Result<WordingRecord, StoreError> {
        self.get_record("wording", id)
    }

    /// Full candidate set for the matcher, in stable id order.
    pub fn list_wordings(&self) -> Result<Vec<WordingRecord>, StoreError> {
        self.list_records("wording")
    }

    // ---- policies ----

    pub fn insert_policy(&self, record: &PolicyRecord) -> Result<(), StoreError> {
        self.put_record("policy", &record.id, record)
    }

    pub fn policy(&self, id: &str) -> Result<PolicyRecord, StoreError> {
        self.get_record("policy", id)
    }

    /// Policies, optionally filtered by customer.
    pub fn list_policies(&self, customer_id: Option<&str>) -> Result<Vec<PolicyRecord>, StoreError> {
        let mut policies: Vec<PolicyRecord> = self.list_records("policy")?;
        if let Some(customer_id) = customer_id {
            policies.retain(|p| p.customer_id == customer_id);
        }
        Ok(policies)
    }

    /// Record the extracted insurer/version fields and advance the policy to
    /// `extracted`.
    ///
    /// Requires a stored extraction payload; allowed from `uploaded` or
    /// `extracted` (re-running extraction is idempotent).
    pub fn record_fields(
        &self,
        policy_id: &str,
        insurer: &str,
        wording_version: &str,
    ) -> Result<PolicyRecord, StoreError> {
        let mut policy: PolicyRecord = self.get_record("policy", policy_id)?;

        if policy.status.rank() > PolicyStatus::Extracted.rank() {
            return Err(StoreError::InvalidTransition {
                from: policy.status.to_string(),
                to: PolicyStatus::Extracted.to_string(),
                reason: "lifecycle only moves forward".into(),
            });
        }
        if policy.ocr_text.is_none() && policy.extraction.is_none() {
            return Err(StoreError::InvalidTransition {
                from: policy.status.to_string(),
                to: PolicyStatus::Extracted.to_string(),
                reason: "policy has no stored extraction to read fields from".into(),
            });
        }

        policy.insurer = Some(insurer.to_string());
        policy.wording_version = Some(wording_version.to_string());
        policy.status = PolicyStatus::Extracted;
        self.put_record("policy", policy_id, &policy)?;
        info!(policy_id, insurer, wording_version, "policy fields recorded");
        Ok(policy)
    }

    /// Record the matched wording and advance the policy to `matched`.
    ///
    /// The match relationship is set once: a second call fails with
    /// [`StoreError::MatchAlreadyRecorded`] regardless of the wording id.
    pub fn record_match(
        &self,
        policy_id: &str,
        wording_id: &str,
    ) -> Result<PolicyRecord, StoreError> {
        let mut policy: PolicyRecord = self.get_record("policy", policy_id)?;

        if let Some(existing) = policy.wording_id {
            return Err(StoreError::MatchAlreadyRecorded {
                policy_id: policy_id.to_string(),
                wording_id: existing,
            });
        }
        if policy.status != PolicyStatus::Extracted {
            return Err(StoreError::InvalidTransition {
                from: policy.status.to_string(),
                to: PolicyStatus::Matched.to_string(),
                reason: "matching requires an extracted policy".into(),
            });
        }
        if policy.insurer.is_none() || policy.wording_version.is_none() {
            return Err(StoreError::InvalidTransition {
                from: policy.status.to_string(),
                to: PolicyStatus::Matched.to_string(),
                reason: "insurer and wording_version must be populated before matching".into(),
            });
        }

        policy.wording_id = Some(wording_id.to_string());
        policy.status = PolicyStatus::Matched;
        self.put_record("policy", policy_id, &policy)?;
        info!(policy_id, wording_id, "policy matched");
        Ok(policy)
    }

    /// Store a comparison report and advance the policy to `compared`.
    ///
    /// Allowed from `matched` or `compared` (re-running a comparison adds a
    /// new analysis record).
    pub fn record_analysis(
        &self,
        policy_id: &str,
        report: JsonValue,
    ) -> Result<AnalysisRecord, StoreError> {
        let mut policy: PolicyRecord = self.get_record("policy", policy_id)?;

        if policy.status.rank() < PolicyStatus::Matched.rank() {
            return Err(StoreError::InvalidTransition {
                from: policy.status.to_string(),
                to: PolicyStatus::Compared.to_string(),
                reason: "comparison requires a matched policy".into(),
            });
        }

        let analysis = AnalysisRecord::new(policy_id, report);
        self.put_record("analysis", &analysis.id, &analysis)?;
        policy.status = PolicyStatus::Compared;
        self.put_record("policy", policy_id, &policy)?;
        info!(policy_id, analysis_id = %analysis.id, "analysis recorded");
        Ok(analysis)
    }

    /// All analyses recorded for a policy, oldest first.
    pub fn analyses_for_policy(&self, policy_id: &str) -> Result<Vec<AnalysisRecord>, StoreError> {
        let mut analyses: Vec<AnalysisRecord> = self.list_records("analysis")?;
        analyses.retain(|a| a.policy_id == policy_id);
        analyses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(analyses)
    }

    /// Flush buffered writes.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.backend.flush()
    }
}
