use crate::types::{
    ConsideredCandidate, MatchError, MatchOutcome, MatchQuery, SearchTerms, WordingCandidate,
};

#[cfg(test)]
mod tests;

/// Normalize an insurer name so that entity-suffix spelling, capitalization,
/// and punctuation differences don't block a match.
///
/// Steps, in order:
/// 1. lowercase
/// 2. "pty" + any run of dots/whitespace + "limited" → "pty ltd"
/// 3. remaining "limited" → "ltd"
/// 4. strip periods
/// 5. collapse whitespace, trim
///
/// The function is idempotent: normalizing an already-normalized string
/// returns it unchanged.
pub fn normalize_insurer(name: &str) -> String {
    let lowered = name.to_lowercase();
    let folded = fold_pty_limited(&lowered);
    let folded = folded.replace("limited", "ltd");
    let stripped = folded.replace('.', "");
    collapse_whitespace(&stripped)
}

/// Rewrites every "pty[.\s]*limited" occurrence as "pty ltd".
///
/// Expects lowercased input; runs before the bare "limited" fold so that
/// "pty. limited" and "pty limited" both land on the canonical "pty ltd".
fn fold_pty_limited(input: &str) -> String {
    const PTY: &str = "pty";
    const LIMITED: &str = "limited";

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix(PTY) {
            let after_gap = stripped.trim_start_matches(|c: char| c == '.' || c.is_whitespace());
            if let Some(tail) = after_gap.strip_prefix(LIMITED) {
                out.push_str("pty ltd");
                rest = tail;
                continue;
            }
        }
        // Advance one char; names are short, so the per-char scan is fine.
        let ch = rest.chars().next().expect("rest is non-empty");
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Collapses repeated whitespace to single spaces and trims the edges.
fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Loose version comparison.
///
/// Versions match when both are empty, or both are non-empty and one is a
/// substring of the other (case-insensitive), or the candidate's stored file
/// name and the query version contain one another (case-insensitive). The
/// substring rule requires both sides non-empty — an empty version must be
/// mutual, not a universal wildcard.
fn versions_match(query_version: &str, candidate: &WordingCandidate) -> bool {
    let qv = query_version.trim().to_lowercase();
    let cv = candidate.wording_version.trim().to_lowercase();

    if qv.is_empty() && cv.is_empty() {
        return true;
    }
    if !qv.is_empty() && !cv.is_empty() && (qv.contains(&cv) || cv.contains(&qv)) {
        return true;
    }
    if !qv.is_empty() {
        if let Some(file_name) = candidate.file_name.as_deref() {
            let fname = file_name.trim().to_lowercase();
            if !fname.is_empty() && (fname.contains(&qv) || qv.contains(&fname)) {
                return true;
            }
        }
    }
    false
}

/// Resolve a policy's insurer + wording-version strings against the full
/// candidate set.
///
/// Two phases:
/// 1. Narrow to candidates whose normalized insurer contains the first token
///    of the normalized query insurer.
/// 2. Within the narrowed set, accept candidates whose normalized insurer is
///    a substring of the query's (or vice versa) AND whose version matches
///    loosely (see [`versions_match`]).
///
/// Exactly one acceptance is a [`MatchOutcome::Matched`]; several are an
/// [`MatchOutcome::Ambiguous`] listing all of them; none is a
/// [`MatchOutcome::NoMatch`] carrying the narrowed candidates for diagnostic
/// display. Identical inputs always produce the identical outcome.
pub fn match_wording(
    query: &MatchQuery,
    candidates: &[WordingCandidate],
) -> Result<MatchOutcome, MatchError> {
    let searched_insurer = normalize_insurer(&query.insurer);
    if searched_insurer.is_empty() {
        return Err(MatchError::EmptyInsurer);
    }
    let searched_version = query.wording_version.trim().to_string();

    let leading_token = searched_insurer
        .split_whitespace()
        .next()
        .expect("normalized insurer is non-empty");

    // Phase 1: narrow on the leading token of the query insurer.
    let narrowed: Vec<(&WordingCandidate, String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let normalized = normalize_insurer(&candidate.insurer);
            normalized
                .contains(leading_token)
                .then_some((candidate, normalized))
        })
        .collect();

    // Phase 2: substring overlap on the full insurer name plus the loose
    // version rule. All satisfying candidates are collected before the
    // outcome is classified, so ordering never decides a match.
    let satisfying: Vec<&(&WordingCandidate, String)> = narrowed
        .iter()
        .filter(|(candidate, normalized)| {
            let insurer_overlap = normalized.contains(&searched_insurer)
                || searched_insurer.contains(normalized.as_str());
            insurer_overlap && versions_match(&searched_version, candidate)
        })
        .collect();

    let searched = SearchTerms {
        insurer: searched_insurer,
        wording_version: searched_version,
    };

    match satisfying.as_slice() {
        [] => Ok(MatchOutcome::NoMatch {
            searched,
            considered: narrowed
                .iter()
                .map(|(candidate, normalized)| considered(candidate, normalized))
                .collect(),
        }),
        [(candidate, _)] => Ok(MatchOutcome::Matched {
            wording_id: candidate.id.clone(),
        }),
        several => Ok(MatchOutcome::Ambiguous {
            searched,
            candidates: several
                .iter()
                .map(|(candidate, normalized)| considered(candidate, normalized))
                .collect(),
        }),
    }
}

fn considered(candidate: &WordingCandidate, normalized_insurer: &str) -> ConsideredCandidate {
    ConsideredCandidate {
        id: candidate.id.clone(),
        insurer: normalized_insurer.to_string(),
        wording_version: candidate.wording_version.clone(),
        file_name: candidate.file_name.clone(),
    }
}
