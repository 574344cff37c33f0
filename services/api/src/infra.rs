use bias_rank::config::ConfigError;
use bias_rank::error::AppError;
use bias_rank::ranking::{
    BiasRankingService, Candidate, CandidateDirectory, CandidateId, Mandate, MandateId,
    MandateLookup, ReliabilityRecord, ReliabilityStore, RepositoryError, ScoringConfig, Source,
    SourceId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot of the external record store, as exported to JSON.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecordExport {
    #[serde(default)]
    pub(crate) mandates: Vec<Mandate>,
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
    #[serde(default)]
    pub(crate) sources: Vec<Source>,
    #[serde(default)]
    pub(crate) reliability: Vec<ReliabilityRecord>,
}

impl RecordExport {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryDirectory {
    candidates: HashMap<CandidateId, Candidate>,
    sources: HashMap<CandidateId, Vec<Source>>,
}

impl CandidateDirectory for InMemoryDirectory {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.candidates.get(id).cloned())
    }

    fn sources_for(
        &self,
        candidate: &CandidateId,
        _mandate: &MandateId,
    ) -> Result<Vec<Source>, RepositoryError> {
        Ok(self.sources.get(candidate).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryMandates {
    mandates: HashMap<MandateId, Mandate>,
}

impl MandateLookup for InMemoryMandates {
    fn mandate(&self, id: &MandateId) -> Result<Option<Mandate>, RepositoryError> {
        Ok(self.mandates.get(id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryReliabilityStore {
    records: Mutex<HashMap<SourceId, ReliabilityRecord>>,
}

impl InMemoryReliabilityStore {
    /// Current ledger ordered by source id.
    pub(crate) fn records(&self) -> Result<Vec<ReliabilityRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| left.source_id.cmp(&right.source_id));
        Ok(records)
    }
}

impl ReliabilityStore for InMemoryReliabilityStore {
    fn fetch(&self, source: &SourceId) -> Result<Option<ReliabilityRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        Ok(guard.get(source).cloned())
    }

    fn save(&self, record: ReliabilityRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(|_| poisoned())?;
        guard.insert(record.source_id.clone(), record);
        Ok(())
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("reliability ledger lock poisoned".to_string())
}

pub(crate) type RankingService =
    BiasRankingService<InMemoryDirectory, InMemoryMandates, InMemoryReliabilityStore>;

/// Wires in-memory stores seeded from `records` into a ranking service.
pub(crate) fn build_service(
    records: RecordExport,
    config: ScoringConfig,
) -> Result<Arc<RankingService>, AppError> {
    let (service, _) = build_service_with_store(records, config)?;
    Ok(service)
}

pub(crate) fn build_service_with_store(
    records: RecordExport,
    config: ScoringConfig,
) -> Result<(Arc<RankingService>, Arc<InMemoryReliabilityStore>), AppError> {
    let RecordExport {
        mandates,
        candidates,
        sources,
        reliability,
    } = records;

    let mut directory = InMemoryDirectory::default();
    for candidate in candidates {
        directory.candidates.insert(candidate.id.clone(), candidate);
    }
    for source in sources {
        directory
            .sources
            .entry(source.candidate_id.clone())
            .or_default()
            .push(source);
    }

    let mandates = InMemoryMandates {
        mandates: mandates
            .into_iter()
            .map(|mandate| (mandate.id.clone(), mandate))
            .collect(),
    };

    let store = Arc::new(InMemoryReliabilityStore::default());
    for record in reliability {
        store
            .save(record)
            .map_err(|err| AppError::Ranking(err.into()))?;
    }

    let service = BiasRankingService::new(
        Arc::new(directory),
        Arc::new(mandates),
        store.clone(),
        config,
    )
    .map_err(|err| AppError::Config(ConfigError::Scoring(err)))?;

    Ok((Arc::new(service), store))
}
