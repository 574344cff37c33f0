use super::super::domain::{
    CandidateId, MandateId, OutcomeEvent, OutcomeResult, OutcomeStage, SourceCitation, SourceId,
};
use super::super::normalizer::normalize_tag;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) struct ParsedOutcomes {
    pub(crate) events: Vec<OutcomeEvent>,
    pub(crate) skipped_rows: usize,
}

pub(crate) fn parse_outcomes<R: Read>(reader: R) -> Result<ParsedOutcomes, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut events = Vec::new();
    let mut skipped_rows = 0;

    for record in csv_reader.deserialize::<OutcomeRow>() {
        let row = record?;
        match row.into_event() {
            Some(event) => events.push(event),
            None => skipped_rows += 1,
        }
    }

    Ok(ParsedOutcomes {
        events,
        skipped_rows,
    })
}

#[derive(Debug, Deserialize)]
struct OutcomeRow {
    #[serde(rename = "Candidate ID")]
    candidate_id: String,
    #[serde(rename = "Mandate ID")]
    mandate_id: String,
    #[serde(rename = "Stage")]
    stage: String,
    #[serde(rename = "Result")]
    result: String,
    #[serde(rename = "Recorded At")]
    recorded_at: String,
    #[serde(
        rename = "Endorsing Sources",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    endorsing_sources: Option<String>,
    #[serde(
        rename = "Dissenting Sources",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    dissenting_sources: Option<String>,
}

impl OutcomeRow {
    fn into_event(self) -> Option<OutcomeEvent> {
        if self.candidate_id.is_empty() || self.mandate_id.is_empty() {
            return None;
        }

        let stage = parse_stage(&self.stage)?;
        let result = parse_result(&self.result)?;
        let timestamp = parse_timestamp(&self.recorded_at)?;

        let mut citations = split_sources(self.endorsing_sources.as_deref(), true);
        citations.extend(split_sources(self.dissenting_sources.as_deref(), false));

        Some(OutcomeEvent {
            candidate_id: CandidateId(self.candidate_id),
            mandate_id: MandateId(self.mandate_id),
            stage,
            result,
            timestamp,
            citations,
        })
    }
}

fn parse_stage(value: &str) -> Option<OutcomeStage> {
    match normalize_tag(value).as_str() {
        "shortlist" | "shortlisted" => Some(OutcomeStage::Shortlist),
        "interview" | "interviewed" => Some(OutcomeStage::Interview),
        "offer" | "offered" => Some(OutcomeStage::Offer),
        "placement" | "placed" | "hired" => Some(OutcomeStage::Placement),
        _ => None,
    }
}

fn parse_result(value: &str) -> Option<OutcomeResult> {
    match normalize_tag(value).as_str() {
        "advanced" | "passed" | "accepted" | "success" => Some(OutcomeResult::Advanced),
        "rejected" | "declined" | "failed" | "withdrawn" => Some(OutcomeResult::Rejected),
        _ => None,
    }
}

fn split_sources(raw: Option<&str>, endorsed: bool) -> Vec<SourceCitation> {
    raw.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| SourceCitation {
                source_id: SourceId(id.to_string()),
                endorsed,
            })
            .collect()
    })
    .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
