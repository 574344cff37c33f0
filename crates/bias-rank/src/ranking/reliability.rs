use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use super::domain::{clamp_unit, OutcomeEvent, ReliabilityRecord, SourceCitation, SourceId};
use super::repository::{ReliabilityLookup, ReliabilityStore, RepositoryError};
use super::scoring::ScoringConfig;

/// Bayesian shrinkage of a source's hit rate toward `prior_mean`.
///
/// With `strength` pseudo-observations at the prior, a source needs a track record
/// before its reliability moves far from neutral.
pub fn shrunk_reliability(correct_uses: u32, total_uses: u32, prior_mean: f64, strength: f64) -> f64 {
    let correct = correct_uses.min(total_uses) as f64;
    let denominator = total_uses as f64 + strength;
    if denominator <= 0.0 {
        return clamp_unit(prior_mean);
    }
    clamp_unit((correct + strength * prior_mean) / denominator)
}

/// Maintains per-source reliability from recorded hiring outcomes.
///
/// Updates are read-modify-write under a lock keyed by source id, so concurrent outcome
/// ingestion never loses increments while unrelated sources proceed in parallel.
pub struct ReliabilityTracker<S> {
    store: Arc<S>,
    prior_mean: f64,
    shrinkage_strength: f64,
    source_locks: Mutex<HashMap<SourceId, Arc<Mutex<()>>>>,
    version: AtomicU64,
}

impl<S> ReliabilityTracker<S>
where
    S: ReliabilityStore,
{
    pub fn new(store: Arc<S>, config: &ScoringConfig) -> Self {
        Self {
            store,
            prior_mean: config.prior_mean,
            shrinkage_strength: config.shrinkage_strength,
            source_locks: Mutex::new(HashMap::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Monotonic counter bumped by every saved update; part of the score cache key.
    pub fn store_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn prior_mean(&self) -> f64 {
        self.prior_mean
    }

    /// Applies an outcome to every source it cites and returns the updated records.
    ///
    /// Each source counts once per outcome. A source cited both for and against the
    /// candidate is dropped from the event. Writes are all-or-nothing: if any save fails,
    /// sources already written are restored and the store version is left untouched.
    pub fn record_outcome(
        &self,
        event: &OutcomeEvent,
    ) -> Result<Vec<ReliabilityRecord>, ReliabilityError> {
        let stances = self.distinct_stances(event);
        if stances.is_empty() {
            debug!(
                candidate_id = %event.candidate_id,
                mandate_id = %event.mandate_id,
                "outcome cites no usable sources; reliability unchanged"
            );
            return Ok(Vec::new());
        }

        let mut lock_order: Vec<&SourceId> = stances.iter().map(|(source, _)| source).collect();
        lock_order.sort();
        let locks = lock_order
            .into_iter()
            .map(|source| self.lock_for(source))
            .collect::<Result<Vec<_>, _>>()?;
        let _guards = locks
            .iter()
            .map(|lock| lock.lock().map_err(|_| ReliabilityError::LockPoisoned))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pending = Vec::with_capacity(stances.len());
        for (source, endorsed) in &stances {
            let previous = self.store.fetch(source)?;
            let correct = SourceCitation {
                source_id: source.clone(),
                endorsed: *endorsed,
            }
            .was_correct(event.result);
            let record = self.advance(previous.clone(), source, correct, event);
            pending.push((previous, record, correct));
        }

        for (written, (_, record, _)) in pending.iter().enumerate() {
            if let Err(err) = self.store.save(record.clone()) {
                self.restore(&pending[..written]);
                return Err(err.into());
            }
        }
        self.version.fetch_add(pending.len() as u64, Ordering::AcqRel);

        Ok(pending
            .into_iter()
            .map(|(_, record, correct)| {
                debug!(
                    source_id = %record.source_id,
                    correct,
                    correct_uses = record.correct_uses,
                    total_uses = record.total_uses,
                    reliability = record.reliability,
                    "source reliability updated"
                );
                record
            })
            .collect())
    }

    pub fn record(&self, source: &SourceId) -> Result<ReliabilityRecord, ReliabilityError> {
        Ok(self
            .store
            .fetch(source)?
            .unwrap_or_else(|| ReliabilityRecord::empty(source.clone(), self.prior_mean)))
    }

    /// One stance per source, in first-citation order.
    fn distinct_stances(&self, event: &OutcomeEvent) -> Vec<(SourceId, bool)> {
        let mut stances: Vec<(SourceId, bool)> = Vec::with_capacity(event.citations.len());
        let mut conflicted: HashSet<&SourceId> = HashSet::new();

        for citation in &event.citations {
            let existing = stances
                .iter()
                .position(|(source, _)| *source == citation.source_id);
            match existing {
                Some(index) if stances[index].1 != citation.endorsed => {
                    conflicted.insert(&citation.source_id);
                }
                Some(_) => {}
                None => stances.push((citation.source_id.clone(), citation.endorsed)),
            }
        }

        for source in &conflicted {
            warn!(
                source_id = %source,
                candidate_id = %event.candidate_id,
                mandate_id = %event.mandate_id,
                "source both endorsed and dissented in one outcome; citation ignored"
            );
        }
        stances.retain(|(source, _)| !conflicted.contains(source));
        stances
    }

    fn advance(
        &self,
        previous: Option<ReliabilityRecord>,
        source: &SourceId,
        correct: bool,
        event: &OutcomeEvent,
    ) -> ReliabilityRecord {
        let mut record =
            previous.unwrap_or_else(|| ReliabilityRecord::empty(source.clone(), self.prior_mean));
        record.correct_uses = record.correct_uses.min(record.total_uses);
        record.total_uses = record.total_uses.saturating_add(1);
        if correct {
            record.correct_uses = record.correct_uses.saturating_add(1);
        }
        record.reliability = shrunk_reliability(
            record.correct_uses,
            record.total_uses,
            self.prior_mean,
            self.shrinkage_strength,
        );
        record.last_calculated_at = Some(event.timestamp);
        record
    }

    /// Puts back the pre-outcome state of sources already saved. A source with no prior
    /// record is reset to an empty one, which reads the same as absent.
    fn restore(&self, written: &[(Option<ReliabilityRecord>, ReliabilityRecord, bool)]) {
        for (previous, record, _) in written {
            let original = previous.clone().unwrap_or_else(|| {
                ReliabilityRecord::empty(record.source_id.clone(), self.prior_mean)
            });
            if let Err(err) = self.store.save(original) {
                error!(
                    source_id = %record.source_id,
                    error = %err,
                    "failed to restore reliability record after aborted outcome"
                );
            }
        }
    }

    fn lock_for(&self, source: &SourceId) -> Result<Arc<Mutex<()>>, ReliabilityError> {
        let mut locks = self
            .source_locks
            .lock()
            .map_err(|_| ReliabilityError::LockPoisoned)?;
        Ok(locks.entry(source.clone()).or_default().clone())
    }
}

impl<S> ReliabilityLookup for ReliabilityTracker<S>
where
    S: ReliabilityStore,
{
    fn reliability_of(&self, source: &SourceId) -> f64 {
        match self.store.fetch(source) {
            Ok(Some(record)) => clamp_unit(record.reliability),
            Ok(None) => self.prior_mean,
            Err(err) => {
                warn!(source_id = %source, error = %err, "reliability lookup failed; using prior");
                self.prior_mean
            }
        }
    }
}

/// Error raised while applying outcomes to the reliability ledger.
#[derive(Debug, thiserror::Error)]
pub enum ReliabilityError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("reliability lock poisoned")]
    LockPoisoned,
}
