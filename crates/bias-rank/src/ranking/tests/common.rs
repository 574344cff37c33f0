use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::ranking::domain::{
    AffinitySignals, Candidate, CandidateId, CompositeScoreSummary, Mandate, MandateId,
    OutcomeEvent, OutcomeResult, OutcomeStage, ReliabilityRecord, SeniorityBand, SeniorityRange,
    Source, SourceCitation, SourceId, SourceType, TagRequirement,
};
use crate::ranking::rankings::{BiasRiskLevel, RankedCandidate, RankingKind, RankingResult};
use crate::ranking::repository::{
    CandidateDirectory, MandateLookup, ReliabilityStore, RepositoryError,
};
use crate::ranking::scoring::{ScoringConfig, ScoringEngine};
use crate::ranking::service::BiasRankingService;

pub(super) const MANDATE: &str = "mand-credit";
pub(super) const EXPERT: &str = "cand-expert";
pub(super) const MIDDLE: &str = "cand-middle";
pub(super) const INSIDER: &str = "cand-insider";

pub(super) fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn candidate_id(value: &str) -> CandidateId {
    CandidateId(value.to_string())
}

pub(super) fn mandate_id() -> MandateId {
    MandateId(MANDATE.to_string())
}

pub(super) fn source_id(value: &str) -> SourceId {
    SourceId(value.to_string())
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn mandate() -> Mandate {
    Mandate {
        id: mandate_id(),
        title: "Head of Private Credit".to_string(),
        sector: TagRequirement::required(["Private Credit"]).with_related(["Credit"]),
        function: TagRequirement::required(["Portfolio Management"]).with_related(["Investment"]),
        asset_class: TagRequirement::required(["Direct Lending"]).with_related(["Mezzanine"]),
        geography: TagRequirement::required(["London"]).with_related(["Europe"]),
        seniority: Some(SeniorityRange {
            min: SeniorityBand::VicePresident,
            max: SeniorityBand::ManagingDirector,
        }),
    }
}

pub(super) fn candidate(
    id: &str,
    sectors: &[&str],
    functions: &[&str],
    asset_classes: &[&str],
    geographies: &[&str],
    seniority: Option<SeniorityBand>,
) -> Candidate {
    Candidate {
        id: candidate_id(id),
        name: None,
        sectors: tags(sectors),
        functions: tags(functions),
        asset_classes: tags(asset_classes),
        geographies: tags(geographies),
        seniority,
    }
}

/// Fit 1.0: every dimension on its required value.
pub(super) fn expert_candidate() -> Candidate {
    candidate(
        EXPERT,
        &["Private Credit"],
        &["Portfolio Management"],
        &["Direct Lending"],
        &["London"],
        Some(SeniorityBand::Director),
    )
}

/// Fit 0.925: asset class on the related value only.
pub(super) fn middle_candidate() -> Candidate {
    candidate(
        MIDDLE,
        &["Private Credit"],
        &["Portfolio Management"],
        &["Mezzanine"],
        &["London"],
        Some(SeniorityBand::VicePresident),
    )
}

/// Fit 0.425: related values everywhere except asset class, one band too junior.
pub(super) fn insider_candidate() -> Candidate {
    candidate(
        INSIDER,
        &["Credit"],
        &["Investment"],
        &[],
        &["Europe"],
        Some(SeniorityBand::Associate),
    )
}

pub(super) fn affinity(employers: u32, connections: u32, institutions: u32) -> AffinitySignals {
    AffinitySignals {
        shared_employers: employers,
        shared_network_connections: connections,
        shared_institutions: institutions,
    }
}

pub(super) fn source(
    id: &str,
    candidate: &str,
    source_type: SourceType,
    asserted: &[&str],
    signals: Option<AffinitySignals>,
) -> Source {
    Source {
        id: source_id(id),
        candidate_id: candidate_id(candidate),
        source_type,
        asserted_tags: tags(asserted),
        affinity: signals,
    }
}

/// Expertise 1.0, similarity 0.0.
pub(super) fn expert_source() -> Source {
    source(
        "src-expert-cv",
        EXPERT,
        SourceType::Document,
        &["Private Credit", "Portfolio Management", "Direct Lending", "London"],
        Some(affinity(0, 0, 0)),
    )
}

/// Expertise 0.5, similarity 0.3.
pub(super) fn middle_source() -> Source {
    source(
        "src-middle-interview",
        MIDDLE,
        SourceType::InterviewNote,
        &["private credit", "MEZZANINE"],
        Some(affinity(0, 2, 0)),
    )
}

/// Expertise 0.0, similarity 0.86.
pub(super) fn insider_source() -> Source {
    source(
        "src-insider-referral",
        INSIDER,
        SourceType::Referral,
        &["Golf"],
        Some(affinity(2, 0, 1)),
    )
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default()).expect("default config is valid")
}

pub(super) fn summary(
    id: &str,
    composite_score: f64,
    avg_expertise_score: f64,
    avg_similarity_score: f64,
) -> CompositeScoreSummary {
    CompositeScoreSummary {
        candidate_id: candidate_id(id),
        mandate_id: mandate_id(),
        base_match_score: 0.5,
        avg_expertise_score,
        avg_similarity_score,
        capped_similarity_score: avg_similarity_score,
        avg_reliability_score: 0.5,
        composite_score,
        source_count: 1,
    }
}

/// Ranking whose order is exactly `ids`.
pub(super) fn ranking(kind: RankingKind, ids: &[&str]) -> RankingResult {
    RankingResult {
        mandate_id: mandate_id(),
        kind,
        entries: ids
            .iter()
            .enumerate()
            .map(|(index, id)| RankedCandidate {
                candidate_id: candidate_id(id),
                rank: index + 1,
                score: 1.0 - index as f64 * 0.1,
                bias_risk_level: BiasRiskLevel::Low,
            })
            .collect(),
    }
}

pub(super) fn outcome(
    candidate: &str,
    result: OutcomeResult,
    citations: &[(&str, bool)],
) -> OutcomeEvent {
    OutcomeEvent {
        candidate_id: candidate_id(candidate),
        mandate_id: mandate_id(),
        stage: OutcomeStage::Interview,
        result,
        timestamp: at(2026, 10, 14),
        citations: citations
            .iter()
            .map(|(id, endorsed)| SourceCitation {
                source_id: source_id(id),
                endorsed: *endorsed,
            })
            .collect(),
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    candidates: Mutex<HashMap<CandidateId, Candidate>>,
    sources: Mutex<Vec<Source>>,
}

impl MemoryDirectory {
    pub(super) fn insert(&self, candidate: Candidate, sources: Vec<Source>) {
        self.candidates
            .lock()
            .expect("directory mutex poisoned")
            .insert(candidate.id.clone(), candidate);
        self.sources
            .lock()
            .expect("directory mutex poisoned")
            .extend(sources);
    }
}

impl CandidateDirectory for MemoryDirectory {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let guard = self.candidates.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn sources_for(
        &self,
        candidate: &CandidateId,
        _mandate: &MandateId,
    ) -> Result<Vec<Source>, RepositoryError> {
        let guard = self.sources.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .filter(|source| &source.candidate_id == candidate)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryMandates {
    mandates: HashMap<MandateId, Mandate>,
}

impl MemoryMandates {
    pub(super) fn with(mandates: impl IntoIterator<Item = Mandate>) -> Self {
        Self {
            mandates: mandates
                .into_iter()
                .map(|mandate| (mandate.id.clone(), mandate))
                .collect(),
        }
    }
}

impl MandateLookup for MemoryMandates {
    fn mandate(&self, id: &MandateId) -> Result<Option<Mandate>, RepositoryError> {
        Ok(self.mandates.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryReliabilityStore {
    records: Mutex<HashMap<SourceId, ReliabilityRecord>>,
}

impl MemoryReliabilityStore {
    pub(super) fn get(&self, id: &str) -> Option<ReliabilityRecord> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&source_id(id))
            .cloned()
    }
}

impl ReliabilityStore for MemoryReliabilityStore {
    fn fetch(&self, source: &SourceId) -> Result<Option<ReliabilityRecord>, RepositoryError> {
        Ok(self.get(&source.0))
    }

    fn save(&self, record: ReliabilityRecord) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.source_id.clone(), record);
        Ok(())
    }
}

/// Ledger whose n-th save (1-based) fails once; every other call succeeds.
pub(super) struct FailingSaveStore {
    pub(super) inner: MemoryReliabilityStore,
    fail_on: usize,
    saves: AtomicUsize,
}

impl FailingSaveStore {
    pub(super) fn failing_on(fail_on: usize) -> Self {
        Self {
            inner: MemoryReliabilityStore::default(),
            fail_on,
            saves: AtomicUsize::new(0),
        }
    }
}

impl ReliabilityStore for FailingSaveStore {
    fn fetch(&self, source: &SourceId) -> Result<Option<ReliabilityRecord>, RepositoryError> {
        self.inner.fetch(source)
    }

    fn save(&self, record: ReliabilityRecord) -> Result<(), RepositoryError> {
        if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(RepositoryError::Unavailable("write rejected".to_string()));
        }
        self.inner.save(record)
    }
}

pub(super) struct UnavailableStore;

impl ReliabilityStore for UnavailableStore {
    fn fetch(&self, _source: &SourceId) -> Result<Option<ReliabilityRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn save(&self, _record: ReliabilityRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) type MemoryService =
    BiasRankingService<MemoryDirectory, MemoryMandates, MemoryReliabilityStore>;

/// Service seeded with the three-candidate credit mandate pool.
pub(super) fn build_service() -> (MemoryService, Arc<MemoryReliabilityStore>) {
    let directory = MemoryDirectory::default();
    directory.insert(expert_candidate(), vec![expert_source()]);
    directory.insert(middle_candidate(), vec![middle_source()]);
    directory.insert(insider_candidate(), vec![insider_source()]);

    let store = Arc::new(MemoryReliabilityStore::default());
    let service = BiasRankingService::new(
        Arc::new(directory),
        Arc::new(MemoryMandates::with([mandate()])),
        store.clone(),
        ScoringConfig::default(),
    )
    .expect("default config is valid");
    (service, store)
}

pub(super) fn pool_ids() -> Vec<CandidateId> {
    [EXPERT, MIDDLE, INSIDER]
        .into_iter()
        .map(candidate_id)
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
