use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::super::divergence::BiasRankingComparison;
use super::super::domain::{MandateId, SourceId, SourceProfile, SourceType};
use super::super::rankings::{BiasRiskLevel, THRESHOLD_TOLERANCE};

const SIMILARITY_HEAVY_GAP: f64 = 0.15;

/// Inclusive calendar window covered by a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub id: String,
    pub window: Option<PeriodWindow>,
}

impl ReportingPeriod {
    /// ISO week ids such as `2026-W42` resolve to their Monday..Sunday window; any other
    /// id is kept as an opaque label that covers every decision handed in.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let window = parse_iso_week(&id);
        Self { id, window }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match self.window {
            Some(window) => {
                let day = at.date_naive();
                day >= window.starts_on && day <= window.ends_on
            }
            None => true,
        }
    }
}

fn parse_iso_week(id: &str) -> Option<PeriodWindow> {
    let (year, week) = id.trim().split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    let starts_on = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
    let ends_on = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)?;
    Some(PeriodWindow { starts_on, ends_on })
}

/// One source's scores as recorded alongside a ranking decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceObservation {
    pub source_id: SourceId,
    pub source_type: SourceType,
    pub expertise_score: f64,
    pub similarity_score: f64,
}

impl SourceObservation {
    /// Similarity exceeds expertise by more than the heavy-gap threshold.
    pub fn is_similarity_heavy(&self) -> bool {
        self.similarity_score - self.expertise_score > SIMILARITY_HEAVY_GAP + THRESHOLD_TOLERANCE
    }
}

impl From<&SourceProfile> for SourceObservation {
    fn from(profile: &SourceProfile) -> Self {
        Self {
            source_id: profile.source_id.clone(),
            source_type: profile.source_type,
            expertise_score: profile.expertise_score,
            similarity_score: profile.similarity_score,
        }
    }
}

/// A recorded ranking run for one mandate and its divergence outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDecision {
    pub mandate_id: MandateId,
    pub recorded_at: DateTime<Utc>,
    pub divergence_score: f64,
    pub max_diff: usize,
    pub bias_risk_level: BiasRiskLevel,
    #[serde(default)]
    pub sources: Vec<SourceObservation>,
}

impl RankingDecision {
    pub fn from_evaluation<'a, I>(
        comparison: &BiasRankingComparison,
        profiles: I,
        recorded_at: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = &'a SourceProfile>,
    {
        Self {
            mandate_id: comparison.mandate_id.clone(),
            recorded_at,
            divergence_score: comparison.divergence_score,
            max_diff: comparison.max_diff,
            bias_risk_level: comparison.bias_risk_level,
            sources: profiles.into_iter().map(SourceObservation::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MandateBiasEntry {
    pub mandate_id: MandateId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mandate_title: Option<String>,
    pub decision_count: usize,
    pub high_bias_events: usize,
    pub avg_divergence: f64,
    pub max_diff: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTypeStat {
    pub source_type: SourceType,
    pub observations: usize,
    pub similarity_heavy_count: usize,
    pub similarity_heavy_share: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasWatchSummary {
    pub period_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window: Option<PeriodWindow>,
    pub decision_count: usize,
    pub high_bias_event_count: usize,
    /// Mean over mandates of each mandate's average divergence.
    pub average_divergence: f64,
    pub most_affected_mandates: Vec<MandateBiasEntry>,
    pub source_type_stats: Vec<SourceTypeStat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_mandates: Vec<MandateId>,
}
