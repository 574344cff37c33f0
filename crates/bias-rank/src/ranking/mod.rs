//! Bias-aware candidate ranking.
//!
//! Candidates are scored against a mandate from five fit dimensions and from per-source
//! expertise, similarity and reliability signals. The same pool is then ranked twice,
//! expertise-led (the recommendation) and similarity-led (a diagnostic counterfactual),
//! and the divergence between the two orders is measured, explained and rolled up into
//! weekly bias-watch reports.

pub mod divergence;
pub mod domain;
pub mod explain;
mod normalizer;
pub mod outcomes;
pub mod rankings;
pub mod reliability;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use divergence::{
    compare_rankings, divergence_risk_level, BiasRankingComparison, CandidateRankDelta,
};
pub use domain::{
    AffinitySignals, Candidate, CandidateId, CompositeScoreSummary, DimensionScores, Mandate,
    MandateId, MatchScore, OutcomeEvent, OutcomeResult, OutcomeStage, ReliabilityRecord,
    ScoreCacheKey, SeniorityBand, SeniorityRange, Source, SourceCitation, SourceId,
    SourceProfile, SourceType, TagRequirement,
};
pub use explain::{
    build_counterfactual_explanation, build_source_attribution_tags, AttributionLabel,
    AttributionTag, CandidateMovement, CounterfactualExplanation,
};
pub use outcomes::{OutcomeImport, OutcomeImportError, OutcomeLogImporter};
pub use rankings::{
    build_expertise_ranking, build_similarity_ranking, BiasRiskLevel, RankedCandidate,
    RankingKind, RankingResult,
};
pub use reliability::{shrunk_reliability, ReliabilityError, ReliabilityTracker};
pub use report::{
    build_bias_watch_summary, export_bias_summary_as_json, import_bias_summary_from_json,
    BiasWatchExportError, BiasWatchSummary, RankingDecision, ReportingPeriod,
};
pub use repository::{
    CandidateDirectory, MandateLookup, ReliabilityLookup, ReliabilitySnapshot, ReliabilityStore,
    RepositoryError,
};
pub use router::ranking_router;
pub use scoring::{CandidateScorecard, ScoringConfig, ScoringConfigError, ScoringEngine};
pub use service::{
    BiasRankingService, CandidateAttribution, MandateEvaluation, RankingServiceError,
};
