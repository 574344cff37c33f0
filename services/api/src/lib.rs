mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use bias_rank::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
