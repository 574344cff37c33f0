use std::collections::BTreeSet;

use super::super::domain::{
    clamp_unit, Candidate, DimensionScores, Mandate, MatchScore, SeniorityBand, SeniorityRange,
    TagRequirement,
};
use super::super::normalizer::normalize_tags;
use super::config::DimensionWeights;

pub(crate) const EXACT_TIER: f64 = 1.0;
pub(crate) const PARTIAL_TIER: f64 = 0.5;
pub(crate) const NO_MATCH_TIER: f64 = 0.0;

pub(crate) fn score_match(
    candidate: &Candidate,
    mandate: &Mandate,
    weights: &DimensionWeights,
) -> MatchScore {
    let dimension_scores = DimensionScores {
        sector: tag_tier(&candidate.sectors, &mandate.sector),
        function: tag_tier(&candidate.functions, &mandate.function),
        asset_class: tag_tier(&candidate.asset_classes, &mandate.asset_class),
        geography: tag_tier(&candidate.geographies, &mandate.geography),
        seniority: seniority_tier(candidate.seniority, mandate.seniority),
    };

    let weighted = weights.sector * dimension_scores.sector
        + weights.function * dimension_scores.function
        + weights.asset_class * dimension_scores.asset_class
        + weights.geography * dimension_scores.geography
        + weights.seniority * dimension_scores.seniority;

    MatchScore {
        final_score: clamp_unit(weighted),
        dimension_scores,
    }
}

fn tag_tier(candidate_tags: &BTreeSet<String>, requirement: &TagRequirement) -> f64 {
    let candidate_tags = normalize_tags(candidate_tags);
    if candidate_tags.is_empty() {
        return NO_MATCH_TIER;
    }

    let required = normalize_tags(&requirement.required);
    if !candidate_tags.is_disjoint(&required) {
        return EXACT_TIER;
    }

    let related = normalize_tags(&requirement.related);
    if !candidate_tags.is_disjoint(&related) {
        return PARTIAL_TIER;
    }

    NO_MATCH_TIER
}

fn seniority_tier(band: Option<SeniorityBand>, range: Option<SeniorityRange>) -> f64 {
    let (Some(band), Some(range)) = (band, range) else {
        return NO_MATCH_TIER;
    };

    match range.distance_from(band) {
        0 => EXACT_TIER,
        1 => PARTIAL_TIER,
        _ => NO_MATCH_TIER,
    }
}
