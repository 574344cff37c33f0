use super::super::domain::{
    clamp_unit, CandidateId, CompositeScoreSummary, MandateId, MatchScore, SourceProfile,
};
use super::config::ScoringConfig;
use super::profile::NEUTRAL_SIGNAL;

pub(crate) struct SourceAverages {
    pub expertise: f64,
    pub similarity: f64,
    pub reliability: f64,
}

/// Averages across profiles; with no profiles every average is neutral, not zero.
pub(crate) fn average_profiles(profiles: &[SourceProfile]) -> SourceAverages {
    if profiles.is_empty() {
        return SourceAverages {
            expertise: NEUTRAL_SIGNAL,
            similarity: NEUTRAL_SIGNAL,
            reliability: NEUTRAL_SIGNAL,
        };
    }

    let count = profiles.len() as f64;
    let (expertise, similarity, reliability) =
        profiles
            .iter()
            .fold((0.0, 0.0, 0.0), |(expertise, similarity, reliability), profile| {
                (
                    expertise + clamp_unit(profile.expertise_score),
                    similarity + clamp_unit(profile.similarity_score),
                    reliability + clamp_unit(profile.reliability_score),
                )
            });

    SourceAverages {
        expertise: clamp_unit(expertise / count),
        similarity: clamp_unit(similarity / count),
        reliability: clamp_unit(reliability / count),
    }
}

/// Similarity may exceed expertise by at most `margin`.
pub(crate) fn cap_similarity(avg_similarity: f64, avg_expertise: f64, margin: f64) -> f64 {
    clamp_unit(avg_similarity.min(avg_expertise + margin))
}

pub(crate) fn aggregate(
    candidate_id: CandidateId,
    mandate_id: MandateId,
    match_score: &MatchScore,
    profiles: &[SourceProfile],
    config: &ScoringConfig,
) -> CompositeScoreSummary {
    let averages = average_profiles(profiles);
    let base_match_score = clamp_unit(match_score.final_score);
    let capped_similarity_score = cap_similarity(
        averages.similarity,
        averages.expertise,
        config.similarity_cap_margin,
    );

    let weights = &config.composite_weights;
    let composite = weights.base_match * base_match_score
        + weights.expertise * averages.expertise
        + weights.similarity * capped_similarity_score
        + weights.reliability * averages.reliability;

    CompositeScoreSummary {
        candidate_id,
        mandate_id,
        base_match_score,
        avg_expertise_score: averages.expertise,
        avg_similarity_score: averages.similarity,
        capped_similarity_score,
        avg_reliability_score: averages.reliability,
        composite_score: clamp_unit(composite),
        source_count: profiles.len(),
    }
}
