use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, CompositeScoreSummary, MandateId};

const CANDIDATE_LOW_RISK_GAP: f64 = 0.05;
const CANDIDATE_MEDIUM_RISK_GAP: f64 = 0.15;
/// Absorbs decimal representation error at the gap thresholds (0.20 - 0.15 > 0.05 in f64).
pub(crate) const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// Low / medium / high reliance on similarity over expertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasRiskLevel {
    Low,
    Medium,
    High,
}

impl BiasRiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            BiasRiskLevel::Low => "low",
            BiasRiskLevel::Medium => "medium",
            BiasRiskLevel::High => "high",
        }
    }

    /// Candidate-level risk from how far average similarity exceeds average expertise.
    pub fn from_similarity_gap(avg_similarity: f64, avg_expertise: f64) -> Self {
        let gap = avg_similarity - avg_expertise;
        if gap <= CANDIDATE_LOW_RISK_GAP + THRESHOLD_TOLERANCE {
            BiasRiskLevel::Low
        } else if gap <= CANDIDATE_MEDIUM_RISK_GAP + THRESHOLD_TOLERANCE {
            BiasRiskLevel::Medium
        } else {
            BiasRiskLevel::High
        }
    }
}

/// Which signal ordered a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKind {
    /// Ordered by composite score. The recommended ranking.
    ExpertiseLed,
    /// Ordered by average similarity alone. Diagnostic only, never a recommendation.
    SimilarityLed,
}

impl RankingKind {
    pub const fn label(self) -> &'static str {
        match self {
            RankingKind::ExpertiseLed => "expertise-led",
            RankingKind::SimilarityLed => "similarity-led",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate_id: CandidateId,
    /// 1-based position; consecutive with no gaps.
    pub rank: usize,
    /// Composite score for expertise-led rankings, average similarity for similarity-led.
    pub score: f64,
    pub bias_risk_level: BiasRiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub mandate_id: MandateId,
    pub kind: RankingKind,
    pub entries: Vec<RankedCandidate>,
}

impl RankingResult {
    pub fn rank_of(&self, candidate: &CandidateId) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| &entry.candidate_id == candidate)
            .map(|entry| entry.rank)
    }

    pub fn top(&self, n: usize) -> Vec<RankedCandidate> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recommended ranking: descending composite score, ties in input order.
pub fn build_expertise_ranking(
    mandate_id: &MandateId,
    pool: &[CompositeScoreSummary],
) -> RankingResult {
    build_ranking(mandate_id, pool, RankingKind::ExpertiseLed, |summary| {
        summary.composite_score
    })
}

/// Counterfactual ranking by similarity alone, used to audit the recommended one.
pub fn build_similarity_ranking(
    mandate_id: &MandateId,
    pool: &[CompositeScoreSummary],
) -> RankingResult {
    build_ranking(mandate_id, pool, RankingKind::SimilarityLed, |summary| {
        summary.avg_similarity_score
    })
}

fn build_ranking<F>(
    mandate_id: &MandateId,
    pool: &[CompositeScoreSummary],
    kind: RankingKind,
    score: F,
) -> RankingResult
where
    F: Fn(&CompositeScoreSummary) -> f64,
{
    let mut ordered: Vec<&CompositeScoreSummary> = pool.iter().collect();
    // `sort_by` is stable, which keeps input order for equal scores.
    ordered.sort_by(|left, right| score(right).total_cmp(&score(left)));

    let entries = ordered
        .into_iter()
        .enumerate()
        .map(|(index, summary)| RankedCandidate {
            candidate_id: summary.candidate_id.clone(),
            rank: index + 1,
            score: score(summary),
            bias_risk_level: BiasRiskLevel::from_similarity_gap(
                summary.avg_similarity_score,
                summary.avg_expertise_score,
            ),
        })
        .collect();

    RankingResult {
        mandate_id: mandate_id.clone(),
        kind,
        entries,
    }
}
