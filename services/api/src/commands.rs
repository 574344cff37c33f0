use crate::infra::{build_service, build_service_with_store, RecordExport};
use bias_rank::config::AppConfig;
use bias_rank::error::AppError;
use bias_rank::ranking::{
    export_bias_summary_as_json, CandidateId, MandateEvaluation, MandateId, OutcomeLogImporter,
    RankingDecision, ReliabilityRecord,
};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON record export holding mandates, candidates, sources and reliability
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Mandate to rank candidates for
    #[arg(long)]
    pub(crate) mandate: String,
    /// Candidate to include (repeatable). Defaults to every candidate in the export.
    #[arg(long = "candidate")]
    pub(crate) candidates: Vec<String>,
    /// Number of candidates shown side by side in the counterfactual explanation
    #[arg(long, default_value_t = 5)]
    pub(crate) top_n: usize,
    /// Print the full evaluation as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BiasWatchArgs {
    /// JSON record export used to resolve mandate titles
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Reporting period id, e.g. 2026-W42
    #[arg(long)]
    pub(crate) period: String,
    /// JSON array of recorded ranking decisions
    #[arg(long)]
    pub(crate) decisions: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ImportOutcomesArgs {
    /// JSON record export holding the current reliability ledger
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Outcome-log CSV export
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        records,
        mandate,
        candidates,
        top_n,
        json,
    } = args;

    let config = AppConfig::load()?;
    let records = RecordExport::from_path(&records)?;
    let candidate_ids: Vec<CandidateId> = if candidates.is_empty() {
        records
            .candidates
            .iter()
            .map(|candidate| candidate.id.clone())
            .collect()
    } else {
        candidates.into_iter().map(CandidateId).collect()
    };

    let service = build_service(records, config.scoring)?;
    let evaluation =
        service.evaluate_mandate(&MandateId(mandate), &candidate_ids, top_n, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        for line in render_evaluation(&evaluation) {
            println!("{line}");
        }
    }
    Ok(())
}

pub(crate) fn run_bias_watch(args: BiasWatchArgs) -> Result<(), AppError> {
    let BiasWatchArgs {
        records,
        period,
        decisions,
    } = args;

    let config = AppConfig::load()?;
    let records = RecordExport::from_path(&records)?;
    let raw = std::fs::read_to_string(&decisions)?;
    let decisions: Vec<RankingDecision> = serde_json::from_str(&raw)?;

    let service = build_service(records, config.scoring)?;
    let summary = service.bias_watch_summary(&period, &decisions);
    println!("{}", export_bias_summary_as_json(&summary)?);
    Ok(())
}

pub(crate) fn run_import_outcomes(args: ImportOutcomesArgs) -> Result<(), AppError> {
    let ImportOutcomesArgs { records, csv } = args;

    let config = AppConfig::load()?;
    let records = RecordExport::from_path(&records)?;
    let import = OutcomeLogImporter::from_path(&csv)?;

    let (service, store) = build_service_with_store(records, config.scoring)?;
    let updated = service.apply_import(&import)?;
    println!(
        "Applied {} outcome events ({} rows skipped, {} source updates)",
        import.events.len(),
        import.skipped_rows,
        updated.len()
    );

    let ledger = store
        .records()
        .map_err(|err| AppError::Ranking(err.into()))?;
    for line in render_ledger(&ledger) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_evaluation(evaluation: &MandateEvaluation) -> Vec<String> {
    let mut lines = vec![format!(
        "Mandate {}: {} candidates scored (reliability version {})",
        evaluation.mandate_id,
        evaluation.scorecards.len(),
        evaluation.reliability_version
    )];

    lines.push("Expertise-led ranking (recommended):".to_string());
    for entry in &evaluation.expertise_led.entries {
        lines.push(format!(
            "  #{} {} | composite {:.3} | {} bias risk",
            entry.rank,
            entry.candidate_id,
            entry.score,
            entry.bias_risk_level.label()
        ));
    }

    lines.push("Similarity-led ranking (diagnostic only):".to_string());
    for entry in &evaluation.similarity_led.entries {
        lines.push(format!(
            "  #{} {} | similarity {:.3}",
            entry.rank, entry.candidate_id, entry.score
        ));
    }

    let comparison = &evaluation.comparison;
    lines.push(format!(
        "Divergence {:.2} (largest shift {}) -> {} bias risk",
        comparison.divergence_score,
        comparison.max_diff,
        comparison.bias_risk_level.label()
    ));
    lines.push(evaluation.explanation.narrative.clone());

    lines.push("Source attribution:".to_string());
    for candidate in &evaluation.attribution {
        for tag in &candidate.tags {
            lines.push(format!(
                "  - {} / {}: {} (expertise {:.2}, similarity {:.2})",
                tag.candidate_id,
                tag.source_id,
                tag.label.label(),
                tag.expertise_score,
                tag.similarity_score
            ));
        }
    }
    lines
}

fn render_ledger(records: &[ReliabilityRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["Reliability ledger: empty".to_string()];
    }

    let mut lines = vec!["Reliability ledger:".to_string()];
    lines.extend(records.iter().map(|record| {
        format!(
            "  - {}: {}/{} correct -> {:.3}",
            record.source_id, record.correct_uses, record.total_uses, record.reliability
        )
    }));
    lines
}
