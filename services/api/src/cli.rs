use crate::commands::{
    run_bias_watch, run_import_outcomes, run_rank, BiasWatchArgs, ImportOutcomesArgs, RankArgs,
};
use crate::server;
use bias_rank::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Bias-Aware Ranking",
    about = "Rank mandate candidates expertise-first and audit how far similarity would reorder them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one mandate's candidate pool from a record export
    Rank(RankArgs),
    /// Build the weekly bias-watch summary from recorded ranking decisions
    BiasWatch(BiasWatchArgs),
    /// Apply an outcome-log CSV export to source reliability
    ImportOutcomes(ImportOutcomesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON record export used to seed candidates, mandates, sources and reliability
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::BiasWatch(args) => run_bias_watch(args),
        Command::ImportOutcomes(args) => run_import_outcomes(args),
    }
}
