use serde::{Deserialize, Serialize};

/// One schedule section compared against the wording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionComparison {
    /// Section name (e.g. "Public Liability").
    pub name: String,
    /// Limit stated in the schedule, copied verbatim; null when absent.
    pub schedule_limit: Option<String>,
    /// Limit found in the wording; null when the wording states none.
    pub wording_limit: Option<String>,
    /// Whether schedule and wording agree for this section.
    #[serde(rename = "match")]
    pub matched: bool,
    /// Short plain-English explanation.
    pub notes: String,
}

/// An endorsement present on one side but not the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndorsementDifference {
    pub endorsement: String,
    pub in_schedule: bool,
    pub in_wording: bool,
}

/// The comparison report the model is asked to produce.
///
/// Field names and the `match` key mirror the prompt schema exactly; the
/// report is persisted verbatim as the policy's analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ComparisonReport {
    #[serde(default)]
    pub sections: Vec<SectionComparison>,
    #[serde(default)]
    pub missing_sections: Vec<String>,
    #[serde(default)]
    pub endorsement_differences: Vec<EndorsementDifference>,
    #[serde(default)]
    pub overall_risk_summary: String,
}
