mod composite;
mod config;
mod fit;
mod profile;

pub use config::{
    AffinityWeights, CompositeWeights, DimensionWeights, ScoringConfig, ScoringConfigError,
};

use super::domain::{
    Candidate, CandidateId, CompositeScoreSummary, Mandate, MandateId, MatchScore, Source,
    SourceProfile,
};
use super::repository::ReliabilityLookup;
use serde::{Deserialize, Serialize};

/// Stateless scorer holding a validated [`ScoringConfig`].
///
/// Every method is a pure function of its arguments and the configuration, so one
/// engine can be shared across threads scoring independent candidate/mandate pairs.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Five-dimension weighted match between a candidate and a mandate.
    pub fn compute_fit_score(&self, candidate: &Candidate, mandate: &Mandate) -> MatchScore {
        fit::score_match(candidate, mandate, &self.config.dimension_weights)
    }

    /// Independent expertise, similarity and reliability scores for one source.
    pub fn build_source_profile<L>(
        &self,
        source: &Source,
        candidate: &Candidate,
        mandate: &Mandate,
        reliability: &L,
    ) -> SourceProfile
    where
        L: ReliabilityLookup + ?Sized,
    {
        profile::score_source(
            source,
            candidate,
            mandate,
            &self.config.affinity_weights,
            reliability.reliability_of(&source.id),
        )
    }

    pub fn compute_composite(
        &self,
        candidate_id: &CandidateId,
        mandate_id: &MandateId,
        match_score: &MatchScore,
        profiles: &[SourceProfile],
    ) -> CompositeScoreSummary {
        composite::aggregate(
            candidate_id.clone(),
            mandate_id.clone(),
            match_score,
            profiles,
            &self.config,
        )
    }

    /// Runs fit, per-source profiling and aggregation for one candidate.
    ///
    /// Sources belonging to a different candidate are ignored.
    pub fn score_candidate<L>(
        &self,
        candidate: &Candidate,
        mandate: &Mandate,
        sources: &[Source],
        reliability: &L,
    ) -> CandidateScorecard
    where
        L: ReliabilityLookup + ?Sized,
    {
        let match_score = self.compute_fit_score(candidate, mandate);
        let profiles: Vec<SourceProfile> = sources
            .iter()
            .filter(|source| source.candidate_id == candidate.id)
            .map(|source| self.build_source_profile(source, candidate, mandate, reliability))
            .collect();
        let composite =
            self.compute_composite(&candidate.id, &mandate.id, &match_score, &profiles);

        CandidateScorecard {
            match_score,
            profiles,
            composite,
        }
    }
}

/// Everything computed for one candidate under one mandate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScorecard {
    pub match_score: MatchScore,
    pub profiles: Vec<SourceProfile>,
    pub composite: CompositeScoreSummary,
}
