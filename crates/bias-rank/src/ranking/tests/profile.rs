use super::common::*;
use crate::ranking::domain::{ReliabilityRecord, SourceType};
use crate::ranking::repository::ReliabilitySnapshot;

fn prior() -> ReliabilitySnapshot {
    ReliabilitySnapshot::new(Vec::new(), 0.5)
}

#[test]
fn expertise_is_share_of_relevant_tags_evidenced() {
    let profile = engine().build_source_profile(
        &middle_source(),
        &middle_candidate(),
        &mandate(),
        &prior(),
    );

    assert_close(profile.expertise_score, 0.5);
    assert_close(profile.similarity_score, 0.3);
    assert_eq!(profile.source_type, SourceType::InterviewNote);
}

#[test]
fn source_without_assertions_is_neutral_on_expertise() {
    let silent = source(
        "src-silent",
        MIDDLE,
        SourceType::Reference,
        &[],
        None,
    );

    let profile =
        engine().build_source_profile(&silent, &middle_candidate(), &mandate(), &prior());

    assert_eq!(profile.expertise_score, 0.5);
    assert_eq!(profile.similarity_score, 0.5);
}

#[test]
fn no_mandate_relevant_tags_scores_zero_expertise() {
    let candidate = candidate("cand-off", &["Retail"], &["Marketing"], &[], &[], None);
    let note = source(
        "src-note",
        "cand-off",
        SourceType::InterviewNote,
        &["Retail"],
        None,
    );

    let profile = engine().build_source_profile(&note, &candidate, &mandate(), &prior());
    assert_eq!(profile.expertise_score, 0.0);
}

#[test]
fn affinity_does_not_move_expertise() {
    let candidate = expert_candidate();
    let mut close = expert_source();
    close.affinity = Some(affinity(3, 10, 2));

    let distant = engine().build_source_profile(&expert_source(), &candidate, &mandate(), &prior());
    let familiar = engine().build_source_profile(&close, &candidate, &mandate(), &prior());

    assert_eq!(distant.expertise_score, familiar.expertise_score);
    assert_eq!(distant.similarity_score, 0.0);
    assert_eq!(familiar.similarity_score, 1.0);
}

#[test]
fn asserted_tags_do_not_move_similarity() {
    let candidate = insider_candidate();
    let mut evidenced = insider_source();
    evidenced.asserted_tags = tags(&["Credit", "Investment", "Europe"]);

    let referral = engine().build_source_profile(&insider_source(), &candidate, &mandate(), &prior());
    let documented = engine().build_source_profile(&evidenced, &candidate, &mandate(), &prior());

    assert_close(referral.similarity_score, documented.similarity_score);
    assert_eq!(referral.expertise_score, 0.0);
    assert_eq!(documented.expertise_score, 1.0);
}

#[test]
fn reliability_comes_from_lookup_or_prior() {
    let snapshot = ReliabilitySnapshot::new(
        vec![ReliabilityRecord {
            source_id: source_id("src-expert-cv"),
            correct_uses: 9,
            total_uses: 10,
            reliability: 0.8,
            last_calculated_at: None,
        }],
        0.5,
    );

    let known = engine().build_source_profile(
        &expert_source(),
        &expert_candidate(),
        &mandate(),
        &snapshot,
    );
    let unknown = engine().build_source_profile(
        &middle_source(),
        &middle_candidate(),
        &mandate(),
        &snapshot,
    );

    assert_eq!(known.reliability_score, 0.8);
    assert_eq!(unknown.reliability_score, 0.5);
}

#[test]
fn scorecard_ignores_sources_about_other_candidates() {
    let sources = vec![expert_source(), insider_source()];
    let card = engine().score_candidate(&expert_candidate(), &mandate(), &sources, &prior());

    assert_eq!(card.profiles.len(), 1);
    assert_eq!(card.composite.source_count, 1);
    assert_eq!(card.profiles[0].source_id, source_id("src-expert-cv"));
}
