use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::divergence::{compare_rankings, BiasRankingComparison};
use super::domain::{
    Candidate, CandidateId, MandateId, OutcomeEvent, ReliabilityRecord, ScoreCacheKey, Source,
};
use super::explain::{
    build_counterfactual_explanation, build_source_attribution_tags, AttributionTag,
    CounterfactualExplanation,
};
use super::outcomes::OutcomeImport;
use super::rankings::{
    build_expertise_ranking, build_similarity_ranking, BiasRiskLevel, RankingResult,
};
use super::reliability::{ReliabilityError, ReliabilityTracker};
use super::report::{build_bias_watch_summary, BiasWatchSummary, RankingDecision, ReportingPeriod};
use super::repository::{CandidateDirectory, MandateLookup, ReliabilityStore, RepositoryError};
use super::scoring::{CandidateScorecard, ScoringConfig, ScoringConfigError, ScoringEngine};

const MAX_SCORING_ATTEMPTS: usize = 3;

/// Runs `score` until the reliability version is unchanged across a run, returning that
/// version with the result. If outcomes keep landing, the last run is tagged with the
/// version read before it, so cached scores are never labelled newer than their inputs.
pub(crate) fn score_at_stable_version<T>(
    version: impl Fn() -> u64,
    mut score: impl FnMut() -> T,
) -> (u64, T) {
    let mut attempt = 1;
    loop {
        let before = version();
        let result = score();
        let after = version();
        if before == after || attempt >= MAX_SCORING_ATTEMPTS {
            if before != after {
                debug!(
                    before,
                    after,
                    "reliability changed during scoring; tagging older version"
                );
            }
            return (before, result);
        }
        attempt += 1;
    }
}

/// Source attribution for one candidate in an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAttribution {
    pub candidate_id: CandidateId,
    pub tags: Vec<AttributionTag>,
}

/// Full audit of one mandate's candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MandateEvaluation {
    pub mandate_id: MandateId,
    /// Reliability store version the scores were computed against.
    pub reliability_version: u64,
    pub scorecards: Vec<CandidateScorecard>,
    pub expertise_led: RankingResult,
    pub similarity_led: RankingResult,
    pub comparison: BiasRankingComparison,
    pub explanation: CounterfactualExplanation,
    pub attribution: Vec<CandidateAttribution>,
    pub decision: RankingDecision,
}

impl MandateEvaluation {
    pub fn cache_keys(&self) -> Vec<ScoreCacheKey> {
        self.scorecards
            .iter()
            .map(|card| ScoreCacheKey {
                candidate_id: card.composite.candidate_id.clone(),
                mandate_id: self.mandate_id.clone(),
                reliability_version: self.reliability_version,
            })
            .collect()
    }
}

/// Service composing record lookups, the scoring engine and the reliability tracker.
pub struct BiasRankingService<C, M, S> {
    directory: Arc<C>,
    mandates: Arc<M>,
    tracker: Arc<ReliabilityTracker<S>>,
    engine: Arc<ScoringEngine>,
}

impl<C, M, S> BiasRankingService<C, M, S>
where
    C: CandidateDirectory + 'static,
    M: MandateLookup + 'static,
    S: ReliabilityStore + 'static,
{
    pub fn new(
        directory: Arc<C>,
        mandates: Arc<M>,
        store: Arc<S>,
        config: ScoringConfig,
    ) -> Result<Self, ScoringConfigError> {
        let tracker = Arc::new(ReliabilityTracker::new(store, &config));
        let engine = Arc::new(ScoringEngine::new(config)?);

        Ok(Self {
            directory,
            mandates,
            tracker,
            engine,
        })
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn tracker(&self) -> &ReliabilityTracker<S> {
        &self.tracker
    }

    /// Scores, ranks both ways, compares and explains a mandate's candidate pool.
    ///
    /// Duplicate candidate ids are evaluated once, at their first position.
    pub fn evaluate_mandate(
        &self,
        mandate_id: &MandateId,
        candidate_ids: &[CandidateId],
        top_n: usize,
        evaluated_at: DateTime<Utc>,
    ) -> Result<MandateEvaluation, RankingServiceError> {
        let mandate = self
            .mandates
            .mandate(mandate_id)?
            .ok_or_else(|| RankingServiceError::MandateNotFound(mandate_id.clone()))?;

        let mut seen = HashSet::new();
        let mut pool: Vec<(Candidate, Vec<Source>)> = Vec::with_capacity(candidate_ids.len());
        for candidate_id in candidate_ids {
            if !seen.insert(candidate_id) {
                continue;
            }
            let candidate = self
                .directory
                .candidate(candidate_id)?
                .ok_or_else(|| RankingServiceError::CandidateNotFound(candidate_id.clone()))?;
            let sources = self.directory.sources_for(candidate_id, mandate_id)?;
            pool.push((candidate, sources));
        }

        let engine = self.engine.as_ref();
        let tracker = self.tracker.as_ref();
        let (reliability_version, scorecards) = score_at_stable_version(
            || tracker.store_version(),
            || {
                pool.par_iter()
                    .map(|(candidate, sources)| {
                        engine.score_candidate(candidate, &mandate, sources, tracker)
                    })
                    .collect::<Vec<CandidateScorecard>>()
            },
        );

        let composites: Vec<_> = scorecards
            .iter()
            .map(|card| card.composite.clone())
            .collect();
        let expertise_led = build_expertise_ranking(&mandate.id, &composites);
        let similarity_led = build_similarity_ranking(&mandate.id, &composites);
        let comparison = compare_rankings(&expertise_led, &similarity_led);
        let explanation = build_counterfactual_explanation(&mandate.id, &composites, top_n);
        let attribution = scorecards
            .iter()
            .map(|card| CandidateAttribution {
                candidate_id: card.composite.candidate_id.clone(),
                tags: build_source_attribution_tags(&card.composite.candidate_id, &card.profiles),
            })
            .collect();
        let decision = RankingDecision::from_evaluation(
            &comparison,
            scorecards.iter().flat_map(|card| card.profiles.iter()),
            evaluated_at,
        );

        info!(
            mandate_id = %mandate.id,
            pool_size = scorecards.len(),
            divergence = comparison.divergence_score,
            max_diff = comparison.max_diff,
            risk = comparison.bias_risk_level.label(),
            reliability_version,
            "mandate rankings evaluated"
        );
        if comparison.bias_risk_level == BiasRiskLevel::High {
            warn!(
                mandate_id = %mandate.id,
                divergence = comparison.divergence_score,
                "similarity-led ranking diverges sharply from expertise-led ranking"
            );
        }

        Ok(MandateEvaluation {
            mandate_id: mandate.id,
            reliability_version,
            scorecards,
            expertise_led,
            similarity_led,
            comparison,
            explanation,
            attribution,
            decision,
        })
    }

    /// Writes an outcome through the reliability tracker.
    pub fn record_outcome(
        &self,
        event: &OutcomeEvent,
    ) -> Result<Vec<ReliabilityRecord>, RankingServiceError> {
        let updated = self.tracker.record_outcome(event)?;
        info!(
            candidate_id = %event.candidate_id,
            mandate_id = %event.mandate_id,
            stage = event.stage.label(),
            sources_updated = updated.len(),
            "outcome recorded"
        );
        Ok(updated)
    }

    /// Applies every imported event in file order, returning the latest record per update.
    pub fn apply_import(
        &self,
        import: &OutcomeImport,
    ) -> Result<Vec<ReliabilityRecord>, RankingServiceError> {
        if import.skipped_rows > 0 {
            warn!(
                skipped_rows = import.skipped_rows,
                "outcome import skipped unreadable rows"
            );
        }

        let mut updated = Vec::new();
        for event in &import.events {
            updated.extend(self.tracker.record_outcome(event)?);
        }
        info!(
            events = import.events.len(),
            updates = updated.len(),
            "outcome import applied"
        );
        Ok(updated)
    }

    pub fn bias_watch_summary(
        &self,
        period_id: &str,
        decisions: &[RankingDecision],
    ) -> BiasWatchSummary {
        let period = ReportingPeriod::from_id(period_id);
        let summary = build_bias_watch_summary(&period, decisions, self.mandates.as_ref());
        info!(
            period_id,
            decisions = summary.decision_count,
            high_bias_events = summary.high_bias_event_count,
            average_divergence = summary.average_divergence,
            "bias-watch summary built"
        );
        summary
    }
}

/// Error raised by the ranking service.
#[derive(Debug, thiserror::Error)]
pub enum RankingServiceError {
    #[error("mandate '{0}' not found")]
    MandateNotFound(MandateId),
    #[error("candidate '{0}' not found")]
    CandidateNotFound(CandidateId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Reliability(#[from] ReliabilityError),
}
