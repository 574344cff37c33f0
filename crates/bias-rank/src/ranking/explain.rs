use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, CompositeScoreSummary, MandateId, SourceId, SourceProfile};
use super::rankings::{
    build_expertise_ranking, build_similarity_ranking, RankedCandidate, THRESHOLD_TOLERANCE,
};

const MIXED_ATTRIBUTION_BAND: f64 = 0.1;
const NARRATIVE_MOVER_LIMIT: usize = 5;

/// A candidate whose position differs between the two rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMovement {
    pub candidate_id: CandidateId,
    pub expertise_rank: usize,
    pub similarity_rank: usize,
    /// Places gained under similarity-led ranking; negative when the candidate falls.
    pub shift: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualExplanation {
    pub mandate_id: MandateId,
    pub top_expertise_led: Vec<RankedCandidate>,
    pub top_similarity_led: Vec<RankedCandidate>,
    pub movements: Vec<CandidateMovement>,
    pub narrative: String,
}

/// Side-by-side top-N lists plus a narrative of who rises or falls when similarity leads.
pub fn build_counterfactual_explanation(
    mandate_id: &MandateId,
    pool: &[CompositeScoreSummary],
    top_n: usize,
) -> CounterfactualExplanation {
    let expertise_led = build_expertise_ranking(mandate_id, pool);
    let similarity_led = build_similarity_ranking(mandate_id, pool);

    let mut movements: Vec<CandidateMovement> = expertise_led
        .entries
        .iter()
        .filter_map(|entry| {
            let similarity_rank = similarity_led.rank_of(&entry.candidate_id)?;
            let shift = entry.rank as i64 - similarity_rank as i64;
            (shift != 0).then(|| CandidateMovement {
                candidate_id: entry.candidate_id.clone(),
                expertise_rank: entry.rank,
                similarity_rank,
                shift,
            })
        })
        .collect();
    movements.sort_by(|left, right| {
        right
            .shift
            .unsigned_abs()
            .cmp(&left.shift.unsigned_abs())
            .then(left.expertise_rank.cmp(&right.expertise_rank))
    });

    let narrative = narrate(pool.len(), &movements);

    CounterfactualExplanation {
        mandate_id: mandate_id.clone(),
        top_expertise_led: expertise_led.top(top_n),
        top_similarity_led: similarity_led.top(top_n),
        movements,
        narrative,
    }
}

fn narrate(pool_size: usize, movements: &[CandidateMovement]) -> String {
    if pool_size == 0 {
        return "No candidates were scored for this mandate.".to_string();
    }
    if movements.is_empty() {
        return "Similarity-led ranking matches the expertise-led order; no candidate changes position."
            .to_string();
    }

    let describe = |movement: &CandidateMovement| {
        let places = movement.shift.unsigned_abs();
        format!(
            "{} would {} {} place{} (#{} -> #{})",
            movement.candidate_id,
            if movement.shift > 0 { "rise" } else { "fall" },
            places,
            if places == 1 { "" } else { "s" },
            movement.expertise_rank,
            movement.similarity_rank
        )
    };

    let risers: Vec<String> = movements
        .iter()
        .filter(|movement| movement.shift > 0)
        .take(NARRATIVE_MOVER_LIMIT)
        .map(describe)
        .collect();
    let fallers: Vec<String> = movements
        .iter()
        .filter(|movement| movement.shift < 0)
        .take(NARRATIVE_MOVER_LIMIT)
        .map(describe)
        .collect();

    let mut sentences = vec![format!(
        "Under similarity-led ranking {} of {} candidate{} change position.",
        movements.len(),
        pool_size,
        if pool_size == 1 { "" } else { "s" }
    )];
    if !risers.is_empty() {
        sentences.push(format!("Rising: {}.", risers.join("; ")));
    }
    if !fallers.is_empty() {
        sentences.push(format!("Falling: {}.", fallers.join("; ")));
    }
    sentences.join(" ")
}

/// Which signal dominates a single source's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionLabel {
    ExpertiseLed,
    Mixed,
    SimilarityLed,
}

impl AttributionLabel {
    pub const fn label(self) -> &'static str {
        match self {
            AttributionLabel::ExpertiseLed => "expertise-led",
            AttributionLabel::Mixed => "mixed",
            AttributionLabel::SimilarityLed => "similarity-led",
        }
    }

    pub fn classify(expertise: f64, similarity: f64) -> Self {
        if (expertise - similarity).abs() <= MIXED_ATTRIBUTION_BAND + THRESHOLD_TOLERANCE {
            AttributionLabel::Mixed
        } else if expertise > similarity {
            AttributionLabel::ExpertiseLed
        } else {
            AttributionLabel::SimilarityLed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionTag {
    pub candidate_id: CandidateId,
    pub source_id: SourceId,
    pub label: AttributionLabel,
    pub expertise_score: f64,
    pub similarity_score: f64,
}

/// Labels each of a candidate's source profiles without re-scoring them.
pub fn build_source_attribution_tags(
    candidate_id: &CandidateId,
    profiles: &[SourceProfile],
) -> Vec<AttributionTag> {
    profiles
        .iter()
        .map(|profile| AttributionTag {
            candidate_id: candidate_id.clone(),
            source_id: profile.source_id.clone(),
            label: AttributionLabel::classify(profile.expertise_score, profile.similarity_score),
            expertise_score: profile.expertise_score,
            similarity_score: profile.similarity_score,
        })
        .collect()
}
