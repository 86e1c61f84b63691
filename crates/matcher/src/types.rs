use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The policy-side inputs to a match: the extracted insurer name and
/// wording-version string, both free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchQuery {
    /// Extracted insurer name. Must normalize to a non-empty string.
    pub insurer: String,
    /// Extracted wording-version string. May be empty; an empty version only
    /// matches candidates whose version is also empty (or whose file name
    /// satisfies the loose rule).
    pub wording_version: String,
}

/// One reference wording record offered to the matcher.
///
/// Candidates come from the wording store as entered by an operator; the
/// engine never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordingCandidate {
    /// Wording record identifier.
    pub id: String,
    /// Insurer name as entered by the operator.
    pub insurer: String,
    /// Wording version as entered by the operator.
    pub wording_version: String,
    /// Stored file name of the wording document, when one was uploaded.
    /// Participates in the loose version rule.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// The normalized search terms, echoed in diagnostic outcomes so operators
/// can see exactly what was looked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchTerms {
    /// Insurer name after [`normalize_insurer`](crate::normalize_insurer).
    pub insurer: String,
    /// Trimmed wording-version string.
    pub wording_version: String,
}

/// A candidate echoed in a diagnostic outcome: its id, *normalized* insurer,
/// and raw version/file name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsideredCandidate {
    pub id: String,
    /// Normalized insurer name, so operators compare like with like.
    pub insurer: String,
    pub wording_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Result of a match attempt.
///
/// Ambiguity is an explicit outcome: when several candidates satisfy the
/// matching conditions the engine reports all of them instead of silently
/// returning whichever happened to come first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Exactly one candidate satisfied both conditions.
    Matched { wording_id: String },
    /// More than one candidate satisfied both conditions. Terminal; requires
    /// an operator to resolve.
    Ambiguous {
        searched: SearchTerms,
        candidates: Vec<ConsideredCandidate>,
    },
    /// No candidate satisfied both conditions. `considered` lists the
    /// candidates that survived the leading-token narrowing (empty when
    /// nothing did). Terminal; requires an operator to resolve.
    NoMatch {
        searched: SearchTerms,
        considered: Vec<ConsideredCandidate>,
    },
}

impl MatchOutcome {
    /// The matched wording id, when this outcome is a match.
    pub fn wording_id(&self) -> Option<&str> {
        match self {
            MatchOutcome::Matched { wording_id } => Some(wording_id),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The query insurer was empty (or normalized to empty). The matcher
    /// refuses to scan candidates against a blank name.
    #[error("query insurer is empty after normalization")]
    EmptyInsurer,
}
