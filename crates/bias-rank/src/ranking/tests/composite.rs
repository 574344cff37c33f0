use super::common::*;
use crate::ranking::domain::{MatchScore, SourceId, SourceProfile, SourceType};
use crate::ranking::repository::ReliabilitySnapshot;

fn profile(expertise: f64, similarity: f64, reliability: f64) -> SourceProfile {
    SourceProfile {
        source_id: SourceId("src".to_string()),
        source_type: SourceType::Document,
        expertise_score: expertise,
        similarity_score: similarity,
        reliability_score: reliability,
    }
}

fn fit(score: f64) -> MatchScore {
    MatchScore {
        final_score: score,
        dimension_scores: Default::default(),
    }
}

#[test]
fn no_sources_yields_neutral_averages() {
    let summary =
        engine().compute_composite(&candidate_id(EXPERT), &mandate_id(), &fit(0.5), &[]);

    assert_eq!(summary.avg_expertise_score, 0.5);
    assert_eq!(summary.avg_similarity_score, 0.5);
    assert_eq!(summary.avg_reliability_score, 0.5);
    assert_eq!(summary.source_count, 0);
    assert_close(summary.composite_score, 0.5);
}

#[test]
fn similarity_is_capped_at_expertise_plus_margin() {
    let profiles = [profile(0.2, 0.9, 0.5), profile(0.2, 0.9, 0.5)];
    let summary =
        engine().compute_composite(&candidate_id(INSIDER), &mandate_id(), &fit(0.4), &profiles);

    assert_close(summary.avg_similarity_score, 0.9);
    assert_close(summary.capped_similarity_score, 0.35);
    assert!(summary.capped_similarity_score <= summary.avg_expertise_score + 0.15 + 1e-9);
}

#[test]
fn cap_only_binds_when_similarity_outruns_expertise() {
    let near = [profile(0.9, 0.95, 0.5)];
    let far = [profile(0.5, 0.95, 0.5)];

    let kept = engine().compute_composite(&candidate_id(EXPERT), &mandate_id(), &fit(0.5), &near);
    let capped = engine().compute_composite(&candidate_id(MIDDLE), &mandate_id(), &fit(0.5), &far);

    assert_close(kept.capped_similarity_score, 0.95);
    assert_close(capped.capped_similarity_score, 0.65);
}

#[test]
fn similarity_beyond_the_cap_cannot_raise_the_composite() {
    let modest = [profile(0.3, 0.5, 0.5)];
    let extreme = [profile(0.3, 1.0, 0.5)];

    let a = engine().compute_composite(&candidate_id(INSIDER), &mandate_id(), &fit(0.6), &modest);
    let b = engine().compute_composite(&candidate_id(INSIDER), &mandate_id(), &fit(0.6), &extreme);

    assert_close(a.composite_score, b.composite_score);
}

#[test]
fn higher_expertise_raises_the_composite() {
    let mut previous = -1.0;
    for expertise in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let profiles = [profile(expertise, 0.4, 0.5)];
        let summary =
            engine().compute_composite(&candidate_id(MIDDLE), &mandate_id(), &fit(0.7), &profiles);
        assert!(summary.composite_score > previous, "{summary:?}");
        previous = summary.composite_score;
    }
}

#[test]
fn higher_reliability_raises_the_composite() {
    let low = [profile(0.6, 0.2, 0.2)];
    let high = [profile(0.6, 0.2, 0.9)];

    let a = engine().compute_composite(&candidate_id(MIDDLE), &mandate_id(), &fit(0.7), &low);
    let b = engine().compute_composite(&candidate_id(MIDDLE), &mandate_id(), &fit(0.7), &high);

    assert!(b.composite_score > a.composite_score);
}

#[test]
fn out_of_range_inputs_are_clamped() {
    let profiles = [profile(1.7, -0.3, f64::NAN)];
    let summary =
        engine().compute_composite(&candidate_id(EXPERT), &mandate_id(), &fit(1.4), &profiles);

    assert_eq!(summary.base_match_score, 1.0);
    assert_eq!(summary.avg_expertise_score, 1.0);
    assert_eq!(summary.avg_similarity_score, 0.0);
    assert_eq!(summary.avg_reliability_score, 0.0);
    assert!((0.0..=1.0).contains(&summary.composite_score));
}

#[test]
fn scorecards_for_the_reference_pool() {
    let prior = ReliabilitySnapshot::new(Vec::new(), 0.5);
    let engine = engine();
    let mandate = mandate();

    let expert = engine.score_candidate(&expert_candidate(), &mandate, &[expert_source()], &prior);
    let middle = engine.score_candidate(&middle_candidate(), &mandate, &[middle_source()], &prior);
    let insider =
        engine.score_candidate(&insider_candidate(), &mandate, &[insider_source()], &prior);

    assert_close(expert.composite.composite_score, 0.85);
    assert_close(middle.composite.composite_score, 0.65);
    assert_close(insider.composite.composite_score, 0.235);
    assert_close(insider.composite.capped_similarity_score, 0.15);
}
