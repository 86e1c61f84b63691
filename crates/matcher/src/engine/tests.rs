use super::*;

fn candidate(id: &str, insurer: &str, version: &str) -> WordingCandidate {
    WordingCandidate {
        id: id.to_string(),
        insurer: insurer.to_string(),
        wording_version: version.to_string(),
        file_name: None,
    }
}

fn query(insurer: &str, version: &str) -> MatchQuery {
    MatchQuery {
        insurer: insurer.to_string(),
        wording_version: version.to_string(),
    }
}

mod normalization {
    use super::*;

    #[test]
    fn lowercases_and_folds_suffixes() {
        assert_eq!(
            normalize_insurer("DUAL Australia Pty Limited"),
            "dual australia pty ltd"
        );
        assert_eq!(normalize_insurer("XYZ Limited"), "xyz ltd");
    }

    #[test]
    fn pty_limited_variants_agree() {
        assert_eq!(
            normalize_insurer("DUAL Australia Pty Limited"),
            normalize_insurer("dual australia pty. limited")
        );
        assert_eq!(
            normalize_insurer("dual australia pty.limited"),
            "dual australia pty ltd"
        );
        assert_eq!(
            normalize_insurer("dual australia pty   limited"),
            "dual australia pty ltd"
        );
    }

    #[test]
    fn strips_periods_and_collapses_whitespace() {
        assert_eq!(
            normalize_insurer("  A.B.C.   Insurance \t Ltd.  "),
            "abc insurance ltd"
        );
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "DUAL Australia Pty Limited",
            "xyz ltd",
            "A.B.C. Insurance Limited",
            "pty. limited",
            "",
        ];
        for input in inputs {
            let once = normalize_insurer(input);
            let twice = normalize_insurer(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn bare_ltd_left_alone() {
        assert_eq!(normalize_insurer("Acme Pty Ltd"), "acme pty ltd");
    }
}

mod matching {
    use super::*;

    #[test]
    fn exact_candidate_matches() {
        let candidates = vec![
            candidate("w-1", "DUAL Australia Pty Limited", "11.20"),
            candidate("w-2", "Chubb Insurance Australia", "3.0"),
        ];
        let outcome = match_wording(&query("dual australia pty. limited", "11.20"), &candidates)
            .expect("valid query");
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }

    #[test]
    fn shortened_insurer_matches_by_substring() {
        // Extraction often yields just the brand: "DUAL".
        let candidates = vec![candidate("w-1", "DUAL Australia Pty Limited", "11.20")];
        let outcome = match_wording(&query("DUAL", "11.20"), &candidates).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }

    #[test]
    fn no_leading_token_overlap_gives_empty_considered() {
        let candidates = vec![
            candidate("w-1", "Chubb Insurance", "1.0"),
            candidate("w-2", "Allianz Australia", "2.0"),
        ];
        let outcome = match_wording(&query("DUAL Australia", "11.20"), &candidates).unwrap();
        match outcome {
            MatchOutcome::NoMatch {
                searched,
                considered,
            } => {
                assert_eq!(searched.insurer, "dual australia");
                assert!(considered.is_empty());
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn version_mismatch_reports_considered_candidates() {
        let candidates = vec![candidate("w-1", "DUAL Australia Pty Ltd", "9.1")];
        let outcome = match_wording(&query("DUAL Australia Pty Limited", "11.20"), &candidates)
            .unwrap();
        match outcome {
            MatchOutcome::NoMatch { considered, .. } => {
                assert_eq!(considered.len(), 1);
                assert_eq!(considered[0].id, "w-1");
                // Candidates are echoed with the normalized insurer.
                assert_eq!(considered[0].insurer, "dual australia pty ltd");
                assert_eq!(considered[0].wording_version, "9.1");
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn two_satisfying_candidates_are_ambiguous() {
        let candidates = vec![
            candidate("w-1", "DUAL Australia Pty Ltd", "11.20"),
            candidate("w-2", "DUAL Australia", "11.2"),
        ];
        let outcome = match_wording(&query("DUAL Australia Pty Limited", "11.2"), &candidates)
            .unwrap();
        match outcome {
            MatchOutcome::Ambiguous { candidates, .. } => {
                let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["w-1", "w-2"]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let candidates = vec![
            candidate("w-1", "DUAL Australia Pty Ltd", "11.20"),
            candidate("w-2", "DUAL Asia", "9.0"),
            candidate("w-3", "Chubb Insurance", "3.0"),
        ];
        let q = query("DUAL Australia Pty Limited", "11.20");
        let first = match_wording(&q, &candidates).unwrap();
        let second = match_wording(&q, &candidates).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_insurer_refused() {
        let candidates = vec![candidate("w-1", "DUAL Australia", "11.20")];
        assert_eq!(
            match_wording(&query("", "11.20"), &candidates),
            Err(MatchError::EmptyInsurer)
        );
        // Punctuation-only names normalize to empty and are refused too.
        assert_eq!(
            match_wording(&query(" . . ", "11.20"), &candidates),
            Err(MatchError::EmptyInsurer)
        );
    }

    #[test]
    fn empty_candidate_set_is_no_match() {
        let outcome = match_wording(&query("DUAL", "11.20"), &[]).unwrap();
        assert!(matches!(
            outcome,
            MatchOutcome::NoMatch { ref considered, .. } if considered.is_empty()
        ));
    }
}

mod versions {
    use super::*;

    #[test]
    fn both_empty_versions_match() {
        let candidates = vec![candidate("w-1", "DUAL Australia", "")];
        let outcome = match_wording(&query("DUAL Australia", ""), &candidates).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }

    #[test]
    fn empty_query_version_does_not_wildcard() {
        // An empty extracted version must not match a candidate that has one.
        let candidates = vec![candidate("w-1", "DUAL Australia", "11.20")];
        let outcome = match_wording(&query("DUAL Australia", ""), &candidates).unwrap();
        assert!(matches!(outcome, MatchOutcome::NoMatch { .. }));
    }

    #[test]
    fn version_substring_either_direction() {
        let candidates = vec![candidate("w-1", "DUAL Australia", "V11.2")];
        let outcome = match_wording(&query("DUAL Australia", "11.2"), &candidates).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));

        let candidates = vec![candidate("w-1", "DUAL Australia", "11.2")];
        let outcome = match_wording(&query("DUAL Australia", "V11.2"), &candidates).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }

    #[test]
    fn file_name_satisfies_version_rule() {
        let mut c = candidate("w-1", "DUAL Australia", "reference copy");
        c.file_name = Some("DUAL-Wording-11.20.pdf".into());
        let outcome = match_wording(&query("DUAL Australia", "11.20"), &[c]).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }

    #[test]
    fn file_name_comparison_is_case_insensitive() {
        let mut c = candidate("w-1", "DUAL Australia", "reference copy");
        c.file_name = Some("dual-wording-v11.2.PDF".into());
        let outcome = match_wording(&query("DUAL Australia", "V11.2"), &[c]).unwrap();
        assert_eq!(outcome.wording_id(), Some("w-1"));
    }
}
