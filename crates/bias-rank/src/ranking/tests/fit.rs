use super::common::*;
use crate::ranking::domain::{Candidate, SeniorityBand, TagRequirement};
use crate::ranking::scoring::{DimensionWeights, ScoringConfig, ScoringEngine};

#[test]
fn perfect_candidate_scores_one() {
    let score = engine().compute_fit_score(&expert_candidate(), &mandate());
    assert_close(score.final_score, 1.0);
    assert_eq!(score.dimension_scores.seniority, 1.0);
}

#[test]
fn sector_exact_and_function_partial_scores_0_525() {
    let candidate = candidate(
        "cand-a",
        &["Private Credit"],
        &["Investment"],
        &[],
        &["Asia"],
        Some(SeniorityBand::Analyst),
    );

    let score = engine().compute_fit_score(&candidate, &mandate());

    assert_eq!(score.dimension_scores.sector, 1.0);
    assert_eq!(score.dimension_scores.function, 0.5);
    assert_eq!(score.dimension_scores.asset_class, 0.0);
    assert_eq!(score.dimension_scores.geography, 0.0);
    assert_eq!(score.dimension_scores.seniority, 0.0);
    assert_close(score.final_score, 0.525);
}

#[test]
fn sector_function_exact_with_asset_class_partial_scores_0_725() {
    let candidate = candidate(
        "cand-b",
        &["private credit"],
        &["Portfolio  Management"],
        &["Mezzanine"],
        &[],
        None,
    );

    let score = engine().compute_fit_score(&candidate, &mandate());
    assert_close(score.final_score, 0.725);
}

#[test]
fn related_values_and_adjacent_band_score_partial_tiers() {
    let score = engine().compute_fit_score(&insider_candidate(), &mandate());
    assert_eq!(score.dimension_scores.sector, 0.5);
    assert_eq!(score.dimension_scores.seniority, 0.5);
    assert_close(score.final_score, 0.425);
}

#[test]
fn empty_candidate_scores_zero_without_failing() {
    let score = engine().compute_fit_score(&Candidate::default(), &mandate());
    assert_eq!(score.final_score, 0.0);
}

#[test]
fn mandate_without_requirements_matches_nothing() {
    let mut open = mandate();
    open.sector = TagRequirement::default();
    open.function = TagRequirement::default();
    open.asset_class = TagRequirement::default();
    open.geography = TagRequirement::default();
    open.seniority = None;

    let score = engine().compute_fit_score(&expert_candidate(), &open);
    assert_eq!(score.final_score, 0.0);
}

#[test]
fn fit_score_stays_in_unit_interval_for_custom_weights() {
    let config = ScoringConfig {
        dimension_weights: DimensionWeights::from_percentages(10.0, 10.0, 10.0, 10.0, 60.0),
        ..ScoringConfig::default()
    };
    let engine = ScoringEngine::new(config).expect("weights sum to one");

    for candidate in [expert_candidate(), middle_candidate(), insider_candidate()] {
        let score = engine.compute_fit_score(&candidate, &mandate());
        assert!((0.0..=1.0).contains(&score.final_score), "{score:?}");
    }
}

#[test]
fn invalid_weights_are_rejected_before_scoring() {
    let config = ScoringConfig {
        dimension_weights: DimensionWeights::from_percentages(40.0, 40.0, 40.0, 0.0, 0.0),
        ..ScoringConfig::default()
    };
    assert!(ScoringEngine::new(config).is_err());
}
