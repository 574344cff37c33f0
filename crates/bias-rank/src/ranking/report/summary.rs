use std::collections::BTreeMap;

use tracing::warn;

use super::super::domain::{MandateId, SourceType};
use super::super::rankings::BiasRiskLevel;
use super::super::repository::MandateLookup;
use super::views::{
    BiasWatchSummary, MandateBiasEntry, RankingDecision, ReportingPeriod, SourceTypeStat,
};

const MAJORITY_SHARE: f64 = 0.5;

#[derive(Debug, Default)]
struct MandateTally {
    decisions: usize,
    high_events: usize,
    divergence_total: f64,
    max_diff: usize,
}

#[derive(Debug, Default)]
struct SourceTypeTally {
    observations: usize,
    similarity_heavy: usize,
}

/// Rolls divergence and risk outcomes for a reporting period into one summary.
///
/// Decisions outside the period window are ignored. Mandates the lookup cannot resolve
/// stay in the summary without a title and are listed in `unresolved_mandates`.
pub fn build_bias_watch_summary<M>(
    period: &ReportingPeriod,
    decisions: &[RankingDecision],
    mandates: &M,
) -> BiasWatchSummary
where
    M: MandateLookup + ?Sized,
{
    let in_period: Vec<&RankingDecision> = decisions
        .iter()
        .filter(|decision| period.contains(decision.recorded_at))
        .collect();

    let mut by_mandate: BTreeMap<&MandateId, MandateTally> = BTreeMap::new();
    let mut by_source_type: BTreeMap<SourceType, SourceTypeTally> = BTreeMap::new();
    let mut high_bias_event_count = 0;

    for decision in &in_period {
        let is_high = decision.bias_risk_level == BiasRiskLevel::High;
        if is_high {
            high_bias_event_count += 1;
        }

        let tally = by_mandate.entry(&decision.mandate_id).or_default();
        tally.decisions += 1;
        tally.divergence_total += decision.divergence_score;
        tally.max_diff = tally.max_diff.max(decision.max_diff);
        if is_high {
            tally.high_events += 1;
        }

        for source in &decision.sources {
            let tally = by_source_type.entry(source.source_type).or_default();
            tally.observations += 1;
            if source.is_similarity_heavy() {
                tally.similarity_heavy += 1;
            }
        }
    }

    let mut unresolved_mandates = Vec::new();
    let mut most_affected_mandates: Vec<MandateBiasEntry> = by_mandate
        .into_iter()
        .map(|(mandate_id, tally)| {
            let mandate_title = match mandates.mandate(mandate_id) {
                Ok(Some(mandate)) => Some(mandate.title),
                Ok(None) => {
                    unresolved_mandates.push(mandate_id.clone());
                    None
                }
                Err(err) => {
                    warn!(mandate_id = %mandate_id, error = %err, "mandate lookup failed during bias-watch summary");
                    unresolved_mandates.push(mandate_id.clone());
                    None
                }
            };

            MandateBiasEntry {
                mandate_id: mandate_id.clone(),
                mandate_title,
                decision_count: tally.decisions,
                high_bias_events: tally.high_events,
                avg_divergence: tally.divergence_total / tally.decisions as f64,
                max_diff: tally.max_diff,
            }
        })
        .collect();

    let average_divergence = if most_affected_mandates.is_empty() {
        0.0
    } else {
        most_affected_mandates
            .iter()
            .map(|entry| entry.avg_divergence)
            .sum::<f64>()
            / most_affected_mandates.len() as f64
    };

    // Input is already in mandate-id order, so the stable sort leaves that as the last tie-break.
    most_affected_mandates.sort_by(|left, right| {
        right
            .high_bias_events
            .cmp(&left.high_bias_events)
            .then(right.avg_divergence.total_cmp(&left.avg_divergence))
    });

    let source_type_stats = SourceType::ordered()
        .into_iter()
        .filter_map(|source_type| {
            by_source_type
                .get(&source_type)
                .map(|tally| source_type_stat(source_type, tally))
        })
        .collect();

    BiasWatchSummary {
        period_id: period.id.clone(),
        window: period.window,
        decision_count: in_period.len(),
        high_bias_event_count,
        average_divergence,
        most_affected_mandates,
        source_type_stats,
        unresolved_mandates,
    }
}

fn source_type_stat(source_type: SourceType, tally: &SourceTypeTally) -> SourceTypeStat {
    let share = if tally.observations == 0 {
        0.0
    } else {
        tally.similarity_heavy as f64 / tally.observations as f64
    };

    let label = source_type.label();
    let comment = if tally.similarity_heavy == 0 {
        format!("No similarity-heavy {label} sources this period.")
    } else if share >= MAJORITY_SHARE {
        format!(
            "Most {label} sources lean on affinity ({} of {}); review before citing them in shortlists.",
            tally.similarity_heavy, tally.observations
        )
    } else {
        format!(
            "{} of {} {label} sources were similarity-heavy.",
            tally.similarity_heavy, tally.observations
        )
    };

    SourceTypeStat {
        source_type,
        observations: tally.observations,
        similarity_heavy_count: tally.similarity_heavy,
        similarity_heavy_share: share,
        comment,
    }
}
