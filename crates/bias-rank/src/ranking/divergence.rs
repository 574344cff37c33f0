use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CandidateId, MandateId};
use super::rankings::{BiasRiskLevel, RankingResult};

const MEDIUM_DIVERGENCE: f64 = 1.5;
const HIGH_DIVERGENCE: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRankDelta {
    pub candidate_id: CandidateId,
    pub rank_a: usize,
    pub rank_b: usize,
    pub rank_delta: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasRankingComparison {
    pub mandate_id: MandateId,
    /// Mean absolute rank difference across candidates present in both rankings.
    pub divergence_score: f64,
    pub max_diff: usize,
    pub bias_risk_level: BiasRiskLevel,
    pub per_candidate_rank_delta: Vec<CandidateRankDelta>,
}

/// Mandate-level risk. Boundaries are inclusive below, exclusive above.
pub fn divergence_risk_level(divergence_score: f64) -> BiasRiskLevel {
    if divergence_score < MEDIUM_DIVERGENCE {
        BiasRiskLevel::Low
    } else if divergence_score < HIGH_DIVERGENCE {
        BiasRiskLevel::Medium
    } else {
        BiasRiskLevel::High
    }
}

/// Compares two rankings of the same pool. Rank deltas are unsigned, so the result's
/// divergence and max difference do not depend on argument order.
pub fn compare_rankings(a: &RankingResult, b: &RankingResult) -> BiasRankingComparison {
    let ranks_b: HashMap<&CandidateId, usize> = b
        .entries
        .iter()
        .map(|entry| (&entry.candidate_id, entry.rank))
        .collect();

    let mut per_candidate_rank_delta = Vec::with_capacity(a.entries.len());
    for entry in &a.entries {
        match ranks_b.get(&entry.candidate_id) {
            Some(&rank_b) => per_candidate_rank_delta.push(CandidateRankDelta {
                candidate_id: entry.candidate_id.clone(),
                rank_a: entry.rank,
                rank_b,
                rank_delta: entry.rank.abs_diff(rank_b),
            }),
            None => debug!(
                candidate_id = %entry.candidate_id,
                "candidate missing from comparison ranking; skipped"
            ),
        }
    }

    let total: usize = per_candidate_rank_delta
        .iter()
        .map(|delta| delta.rank_delta)
        .sum();
    let divergence_score = if per_candidate_rank_delta.is_empty() {
        0.0
    } else {
        total as f64 / per_candidate_rank_delta.len() as f64
    };
    let max_diff = per_candidate_rank_delta
        .iter()
        .map(|delta| delta.rank_delta)
        .max()
        .unwrap_or(0);

    BiasRankingComparison {
        mandate_id: a.mandate_id.clone(),
        divergence_score,
        max_diff,
        bias_risk_level: divergence_risk_level(divergence_score),
        per_candidate_rank_delta,
    }
}
