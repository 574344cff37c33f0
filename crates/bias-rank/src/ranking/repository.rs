use std::collections::HashMap;

use super::domain::{
    Candidate, CandidateId, Mandate, MandateId, ReliabilityRecord, Source, SourceId,
};

/// Read access to candidate records and the sources describing them.
pub trait CandidateDirectory: Send + Sync {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    fn sources_for(
        &self,
        candidate: &CandidateId,
        mandate: &MandateId,
    ) -> Result<Vec<Source>, RepositoryError>;
}

/// Read access to mandate records.
pub trait MandateLookup: Send + Sync {
    fn mandate(&self, id: &MandateId) -> Result<Option<Mandate>, RepositoryError>;
}

/// Persisted reliability ledger. Only the reliability tracker writes to it.
pub trait ReliabilityStore: Send + Sync {
    fn fetch(&self, source: &SourceId) -> Result<Option<ReliabilityRecord>, RepositoryError>;
    fn save(&self, record: ReliabilityRecord) -> Result<(), RepositoryError>;
}

/// Read-only view of cached source reliability used while profiling sources.
pub trait ReliabilityLookup {
    fn reliability_of(&self, source: &SourceId) -> f64;
}

/// Point-in-time copy of reliability records, useful for pure scoring calls.
#[derive(Debug, Clone, Default)]
pub struct ReliabilitySnapshot {
    records: HashMap<SourceId, f64>,
    prior_mean: f64,
}

impl ReliabilitySnapshot {
    pub fn new<I>(records: I, prior_mean: f64) -> Self
    where
        I: IntoIterator<Item = ReliabilityRecord>,
    {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.source_id, record.reliability))
                .collect(),
            prior_mean,
        }
    }
}

impl ReliabilityLookup for ReliabilitySnapshot {
    fn reliability_of(&self, source: &SourceId) -> f64 {
        self.records
            .get(source)
            .copied()
            .unwrap_or(self.prior_mean)
    }
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
