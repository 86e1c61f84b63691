//! Covercheck matching layer: resolve a policy's free-text insurer name and
//! wording-version string to exactly one reference wording record.
//!
//! Extraction hands us whatever the model read off the schedule — "DUAL
//! Australia Pty Limited", "Dual Australia Pty. Ltd", "DUAL" — and an
//! operator typed the wording records in by hand, so the two sides rarely
//! agree byte-for-byte. The engine tolerates the superficial variation
//! (entity-suffix spelling, capitalization, punctuation) without guessing:
//! when more than one candidate qualifies the result is an explicit
//! [`MatchOutcome::Ambiguous`], never a positional pick, and a failed match
//! reports the candidates that were considered so an operator can resolve it
//! manually.
//!
//! The engine is a pure function over its inputs: no I/O, no side effects,
//! deterministic. The caller supplies the candidate set and persists the
//! outcome.
//!
//! ```
//! use matcher::{match_wording, MatchOutcome, MatchQuery, WordingCandidate};
//!
//! let query = MatchQuery {
//!     insurer: "DUAL Australia Pty Limited".into(),
//!     wording_version: "11.20".into(),
//! };
//! let candidates = vec![WordingCandidate {
//!     id: "w-1".into(),
//!     insurer: "Dual Australia Pty. Ltd".into(),
//!     wording_version: "11.20".into(),
//!     file_name: None,
//! }];
//!
//! match match_wording(&query, &candidates).unwrap() {
//!     MatchOutcome::Matched { wording_id } => assert_eq!(wording_id, "w-1"),
//!     other => panic!("expected a match, got {other:?}"),
//! }
//! ```

mod engine;
pub mod types;

pub use engine::{match_wording, normalize_insurer};
pub use types::{
    ConsideredCandidate, MatchError, MatchOutcome, MatchQuery, SearchTerms, WordingCandidate,
};
