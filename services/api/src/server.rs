use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState, RecordExport};
use crate::routes::with_ranking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bias_rank::config::AppConfig;
use bias_rank::error::AppError;
use bias_rank::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let records = match args.records.take() {
        Some(path) => RecordExport::from_path(&path)?,
        None => RecordExport::default(),
    };
    info!(
        candidates = records.candidates.len(),
        mandates = records.mandates.len(),
        sources = records.sources.len(),
        "record export loaded"
    );
    let ranking_service = build_service(records, config.scoring.clone())?;

    let app = with_ranking_routes(ranking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "bias-aware ranking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
