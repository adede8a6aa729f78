//! Behavioral properties of the matching engine, exercised through the
//! public library API.

use ystr_matcher::core::panel::multi_copy_count;
use ystr_matcher::matching::distance::compare;
use ystr_matcher::matching::filter::is_candidate_viable;
use ystr_matcher::matching::partition::search_partitioned;
use ystr_matcher::{
    BatchOrchestrator, CalculationMode, ErrorKind, MarkerPanel, MatchResult, OutboundMessage,
    PanelSize, SearchConfig, SessionState, StrProfile,
};

const MODES: [CalculationMode; 2] = [CalculationMode::Standard, CalculationMode::Extended];

/// A kit with a call for every marker of the panel; `shift` moves every
/// single-copy value up by that many repeats.
fn genotyped(kit: &str, panel: PanelSize, shift: u32) -> StrProfile {
    let mut profile = StrProfile::new(kit);
    for &marker in MarkerPanel::for_size(panel).markers() {
        let value = match multi_copy_count(marker) {
            Some(4) => "15-15-16-17".to_string(),
            Some(_) => "11-14".to_string(),
            None => (13 + shift).to_string(),
        };
        profile.markers.insert(marker.to_string(), value);
    }
    profile
}

fn config(panel: PanelSize, max_distance: u32, max_matches: usize) -> SearchConfig {
    SearchConfig {
        panel_size: panel,
        max_distance,
        max_matches,
        calculation_mode: CalculationMode::Standard,
        expected_total: 0,
    }
}

/// Candidates at a spread of distances from `genotyped("Q", Y12, 0)`
fn mixed_candidates(count: usize) -> Vec<StrProfile> {
    (0..count)
        .map(|i| {
            let mut profile = genotyped(&format!("K{:04}", (i * 7919) % 10_000), PanelSize::Y12, 0);
            let steps = (i % 5) as u32;
            profile
                .markers
                .insert("DYS390".to_string(), (13 + steps).to_string());
            if i % 11 == 0 {
                // Too sparse to qualify
                for marker in ["DYS393", "DYS19", "DYS391"] {
                    profile.markers.remove(marker);
                }
            }
            profile
        })
        .collect()
}

fn run_session(
    query: &StrProfile,
    config: SearchConfig,
    candidates: &[StrProfile],
    batch_size: usize,
) -> Vec<MatchResult> {
    let mut engine = BatchOrchestrator::new();
    let mut out: Vec<OutboundMessage> = Vec::new();
    engine.init(query.clone(), config, &mut out).unwrap();
    for batch in candidates.chunks(batch_size.max(1)) {
        engine.process_batch(batch, &mut out).unwrap();
    }
    engine.finalize(&mut out).unwrap()
}

#[test]
fn test_identity_gives_zero_distance() {
    for panel in PanelSize::ALL {
        for mode in MODES {
            let a = genotyped("A", panel, 0);
            let b = genotyped("B", panel, 0);
            let result = compare(&a, &b, panel, mode);

            assert_eq!(result.distance, 0);
            assert!(result.has_all_required_markers);
            assert_eq!(result.identical_markers, result.compared_markers);
            assert!((result.percent_identical() - 100.0).abs() < f64::EPSILON);
        }
    }
}

#[test]
fn test_quick_filter_is_monotone() {
    let query = genotyped("Q", PanelSize::Y67, 0);
    let markers = MarkerPanel::for_size(PanelSize::Y67).markers();

    // Thin the candidate out one marker at a time, from both ends
    for removed in 0..markers.len() {
        for from_front in [true, false] {
            let mut candidate = genotyped("C", PanelSize::Y67, 1);
            let doomed: Vec<&str> = if from_front {
                markers[..removed].to_vec()
            } else {
                markers[markers.len() - removed..].to_vec()
            };
            for marker in doomed {
                candidate.markers.remove(marker);
            }

            for mode in MODES {
                let result = compare(&query, &candidate, PanelSize::Y67, mode);
                if result.has_all_required_markers {
                    assert!(is_candidate_viable(&candidate, &query, PanelSize::Y67));
                }
            }
        }
    }
}

#[test]
fn test_batch_invariance() {
    let query = genotyped("Q", PanelSize::Y12, 0);
    let candidates = mixed_candidates(257);
    let config = config(PanelSize::Y12, 3, 40);

    let whole = run_session(&query, config, &candidates, candidates.len());
    assert_eq!(whole.len(), 40);

    for batch_size in [1, 7, 100, 256] {
        assert_eq!(
            run_session(&query, config, &candidates, batch_size),
            whole,
            "batch size {batch_size}"
        );
    }
}

#[test]
fn test_partitioned_search_matches_single_session() {
    let query = genotyped("Q", PanelSize::Y12, 0);
    let candidates = mixed_candidates(300);
    let config = config(PanelSize::Y12, 4, 25);

    let single = run_session(&query, config, &candidates, 1000);
    for partitions in [1, 2, 5, 16] {
        let merged = search_partitioned(&query, config, &candidates, partitions).unwrap();
        assert_eq!(merged, single, "{partitions} partitions");
    }
}

#[test]
fn test_threshold_boundary() {
    let panel = MarkerPanel::for_size(PanelSize::Y37);
    let query = genotyped("Q", PanelSize::Y37, 0);

    let keep = |count: usize, kit: &str| {
        let mut candidate = genotyped(kit, PanelSize::Y37, 0);
        for marker in &panel.markers()[count..] {
            candidate.markers.remove(*marker);
        }
        candidate
    };
    let at = keep(panel.min_valid_markers(), "AT");
    let below = keep(panel.min_valid_markers() - 1, "BELOW");

    let matches = run_session(&query, config(PanelSize::Y37, 0, 10), &[at, below], 10);
    let kits: Vec<&str> = matches.iter().map(|m| m.profile.kit_number.as_str()).collect();
    assert_eq!(kits, ["AT"]);
    assert_eq!(matches[0].compared_markers, panel.min_valid_markers());
}

#[test]
fn test_truncation_keeps_closest_then_lowest_kit() {
    let query = genotyped("Q", PanelSize::Y12, 0);
    let mut candidates = Vec::new();
    for (kit, dys390) in [("Z9", "13"), ("B2", "14"), ("A1", "14"), ("M5", "13"), ("C3", "15")] {
        let mut profile = genotyped(kit, PanelSize::Y12, 0);
        profile.markers.insert("DYS390".to_string(), dys390.to_string());
        candidates.push(profile);
    }

    let matches = run_session(&query, config(PanelSize::Y12, 5, 3), &candidates, 2);
    let ranked: Vec<(&str, u32)> = matches
        .iter()
        .map(|m| (m.profile.kit_number.as_str(), m.distance))
        .collect();
    assert_eq!(ranked, [("M5", 0), ("Z9", 0), ("A1", 1)]);
}

#[test]
fn test_query_kit_never_matches_itself() {
    let query = genotyped("SELF", PanelSize::Y12, 0);
    let candidates = vec![query.clone(), genotyped("OTHER", PanelSize::Y12, 0)];

    let matches = run_session(&query, config(PanelSize::Y12, 10, 10), &candidates, 1);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].profile.kit_number, "OTHER");
}

#[test]
fn test_worked_example() {
    let query = genotyped("Q", PanelSize::Y12, 0);
    let mut candidate = genotyped("C", PanelSize::Y12, 0);
    candidate.markers.insert("DYS19".to_string(), "14".to_string());

    let matches = run_session(&query, config(PanelSize::Y12, 2, 10), &[candidate], 10);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].distance, 1);
    assert_eq!(matches[0].compared_markers, 12);
    assert_eq!(matches[0].identical_markers, 11);
    assert!(matches[0].has_all_required_markers);
}

#[test]
fn test_empty_batches_and_empty_result() {
    let mut engine = BatchOrchestrator::new();
    let mut out: Vec<OutboundMessage> = Vec::new();
    engine
        .init(genotyped("Q", PanelSize::Y12, 0), config(PanelSize::Y12, 2, 10), &mut out)
        .unwrap();

    assert!(engine.process_batch(&[], &mut out).unwrap().is_empty());
    assert_eq!(
        out.last(),
        Some(&OutboundMessage::BatchAccepted {
            matches: vec![],
            processed_count_so_far: 0
        })
    );

    assert!(engine.finalize(&mut out).unwrap().is_empty());
    assert_eq!(out.last(), Some(&OutboundMessage::Complete { matches: vec![] }));
    assert_eq!(engine.state(), SessionState::Uninitialized);
}

#[test]
fn test_process_before_init_reports_not_initialized() {
    let mut engine = BatchOrchestrator::new();
    let mut out: Vec<OutboundMessage> = Vec::new();

    engine.handle_json(r#"{"type":"processBatch","candidates":[]}"#, &mut out);
    engine.handle_json(r#"{"type":"finalize"}"#, &mut out);

    assert_eq!(out.len(), 2);
    for message in &out {
        assert!(matches!(
            message,
            OutboundMessage::Error {
                kind: ErrorKind::NotInitialized,
                ..
            }
        ));
    }
    assert_eq!(engine.state(), SessionState::Uninitialized);
}

#[test]
fn test_engine_recovers_after_errors() {
    let mut engine = BatchOrchestrator::new();
    let mut out: Vec<OutboundMessage> = Vec::new();

    engine.handle_json(r#"{"type":"init","panelSize":12}"#, &mut out);
    engine.handle_json(r#"{"type":"cancel"}"#, &mut out);
    let kinds: Vec<ErrorKind> = out
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Error { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, [ErrorKind::MissingParameters, ErrorKind::InvalidMessage]);

    let init = serde_json::json!({
        "type": "init",
        "query": genotyped("Q", PanelSize::Y12, 0),
        "panelSize": 12,
        "maxDistance": 2,
        "maxMatches": 10,
        "calculationMode": "extended",
        "expectedTotal": 1
    });
    engine.handle_json(&init.to_string(), &mut out);
    assert_eq!(engine.state(), SessionState::Ready);
}

#[test]
fn test_progress_counts_every_candidate() {
    let query = genotyped("Q", PanelSize::Y12, 0);
    let candidates = mixed_candidates(250);
    let mut engine = BatchOrchestrator::new();
    let mut out: Vec<OutboundMessage> = Vec::new();

    let config = SearchConfig {
        expected_total: candidates.len(),
        ..config(PanelSize::Y12, 2, 500)
    };
    engine.init(query, config, &mut out).unwrap();
    engine.process_batch(&candidates, &mut out).unwrap();

    let processed: Vec<usize> = out
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Progress { processed_count, .. } => Some(*processed_count),
            OutboundMessage::BatchAccepted {
                processed_count_so_far,
                ..
            } => Some(*processed_count_so_far),
            _ => None,
        })
        .collect();
    assert_eq!(processed, [0, 100, 200, 250]);
}
