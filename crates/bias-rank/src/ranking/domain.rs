use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates supplied by the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for open hiring mandates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MandateId(pub String);

/// Identifier wrapper for an information source about a candidate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MandateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordinal seniority bands, ordered from most junior to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityBand {
    Analyst,
    Associate,
    VicePresident,
    Director,
    ManagingDirector,
    Partner,
}

impl SeniorityBand {
    pub const fn level(self) -> u8 {
        match self {
            SeniorityBand::Analyst => 0,
            SeniorityBand::Associate => 1,
            SeniorityBand::VicePresident => 2,
            SeniorityBand::Director => 3,
            SeniorityBand::ManagingDirector => 4,
            SeniorityBand::Partner => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SeniorityBand::Analyst => "Analyst",
            SeniorityBand::Associate => "Associate",
            SeniorityBand::VicePresident => "Vice President",
            SeniorityBand::Director => "Director",
            SeniorityBand::ManagingDirector => "Managing Director",
            SeniorityBand::Partner => "Partner",
        }
    }
}

/// Candidate attributes as held by the external record store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sectors: BTreeSet<String>,
    #[serde(default)]
    pub functions: BTreeSet<String>,
    #[serde(default)]
    pub asset_classes: BTreeSet<String>,
    #[serde(default)]
    pub geographies: BTreeSet<String>,
    #[serde(default)]
    pub seniority: Option<SeniorityBand>,
}

/// Primary and adjacent values accepted for one mandate dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagRequirement {
    #[serde(default)]
    pub required: BTreeSet<String>,
    #[serde(default)]
    pub related: BTreeSet<String>,
}

impl TagRequirement {
    pub fn required<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            required: values.into_iter().map(Into::into).collect(),
            related: BTreeSet::new(),
        }
    }

    pub fn with_related<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.related = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Inclusive seniority window requested by a mandate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorityRange {
    pub min: SeniorityBand,
    pub max: SeniorityBand,
}

impl SeniorityRange {
    /// Returns the range with `min <= max`, swapping inverted bounds.
    pub fn normalized(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self {
                min: self.max,
                max: self.min,
            }
        }
    }

    /// Number of bands between `band` and the nearest edge of the range (0 when inside).
    pub fn distance_from(self, band: SeniorityBand) -> u8 {
        let range = self.normalized();
        let level = band.level();
        if level < range.min.level() {
            range.min.level() - level
        } else if level > range.max.level() {
            level - range.max.level()
        } else {
            0
        }
    }
}

/// Open hiring requisition with its required attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandate {
    pub id: MandateId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sector: TagRequirement,
    #[serde(default)]
    pub function: TagRequirement,
    #[serde(default)]
    pub asset_class: TagRequirement,
    #[serde(default)]
    pub geography: TagRequirement,
    #[serde(default)]
    pub seniority: Option<SeniorityRange>,
}

/// Where a piece of information about a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Document,
    Referral,
    InterviewNote,
    Reference,
    Network,
    Other,
}

impl SourceType {
    pub const fn label(self) -> &'static str {
        match self {
            SourceType::Document => "document",
            SourceType::Referral => "referral",
            SourceType::InterviewNote => "interview note",
            SourceType::Reference => "reference",
            SourceType::Network => "network",
            SourceType::Other => "other",
        }
    }

    pub const fn ordered() -> [SourceType; 6] {
        [
            SourceType::Document,
            SourceType::Referral,
            SourceType::InterviewNote,
            SourceType::Reference,
            SourceType::Network,
            SourceType::Other,
        ]
    }
}

/// Familiarity signals between the source and the candidate, unrelated to skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AffinitySignals {
    #[serde(default)]
    pub shared_employers: u32,
    #[serde(default)]
    pub shared_network_connections: u32,
    #[serde(default)]
    pub shared_institutions: u32,
}

/// An origin of information about a candidate (document, referral, note, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub candidate_id: CandidateId,
    pub source_type: SourceType,
    /// Domain tags the source explicitly evidences for the candidate.
    #[serde(default)]
    pub asserted_tags: BTreeSet<String>,
    #[serde(default)]
    pub affinity: Option<AffinitySignals>,
}

/// Per (source, candidate, mandate) scores. Derived on demand and never stored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub source_id: SourceId,
    pub source_type: SourceType,
    pub expertise_score: f64,
    pub similarity_score: f64,
    pub reliability_score: f64,
}

/// Persistent reliability ledger entry for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    pub source_id: SourceId,
    pub correct_uses: u32,
    pub total_uses: u32,
    /// Shrunk reliability cached at `last_calculated_at`.
    pub reliability: f64,
    #[serde(default)]
    pub last_calculated_at: Option<DateTime<Utc>>,
}

impl ReliabilityRecord {
    /// Fresh record for a source with no recorded outcomes.
    pub fn empty(source_id: SourceId, prior_mean: f64) -> Self {
        Self {
            source_id,
            correct_uses: 0,
            total_uses: 0,
            reliability: prior_mean,
            last_calculated_at: None,
        }
    }
}

/// Hiring pipeline stage an outcome was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStage {
    Shortlist,
    Interview,
    Offer,
    Placement,
}

impl OutcomeStage {
    pub const fn label(self) -> &'static str {
        match self {
            OutcomeStage::Shortlist => "shortlist",
            OutcomeStage::Interview => "interview",
            OutcomeStage::Offer => "offer",
            OutcomeStage::Placement => "placement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResult {
    Advanced,
    Rejected,
}

/// Source cited by the decision the outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source_id: SourceId,
    /// True when the source recommended the candidate, false when it argued against.
    pub endorsed: bool,
}

impl SourceCitation {
    /// A source's use was correct when its stance agrees with the observed result.
    pub fn was_correct(&self, result: OutcomeResult) -> bool {
        self.endorsed == (result == OutcomeResult::Advanced)
    }
}

/// Append-only ground-truth observation used to update source reliability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub candidate_id: CandidateId,
    pub mandate_id: MandateId,
    pub stage: OutcomeStage,
    pub result: OutcomeResult,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub citations: Vec<SourceCitation>,
}

/// Per-dimension tier values produced by the fit scorer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub sector: f64,
    pub function: f64,
    pub asset_class: f64,
    pub geography: f64,
    pub seniority: f64,
}

/// Weighted candidate/mandate match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub final_score: f64,
    pub dimension_scores: DimensionScores,
}

/// The unit that gets ranked: one candidate under one mandate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScoreSummary {
    pub candidate_id: CandidateId,
    pub mandate_id: MandateId,
    pub base_match_score: f64,
    pub avg_expertise_score: f64,
    pub avg_similarity_score: f64,
    pub capped_similarity_score: f64,
    pub avg_reliability_score: f64,
    pub composite_score: f64,
    pub source_count: usize,
}

/// Cache key under which a composite stays valid, since every other input is caller-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreCacheKey {
    pub candidate_id: CandidateId,
    pub mandate_id: MandateId,
    pub reliability_version: u64,
}

/// Clamp into [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
