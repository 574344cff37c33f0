use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{CandidateId, MandateId, OutcomeEvent};
use super::report::{export_bias_summary_as_json, RankingDecision};
use super::repository::{CandidateDirectory, MandateLookup, ReliabilityStore};
use super::service::{BiasRankingService, RankingServiceError};

const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub candidate_ids: Vec<CandidateId>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BiasWatchRequest {
    #[serde(default)]
    pub decisions: Vec<RankingDecision>,
}

/// Router builder exposing ranking, outcome and bias-watch endpoints.
pub fn ranking_router<C, M, S>(service: Arc<BiasRankingService<C, M, S>>) -> Router
where
    C: CandidateDirectory + 'static,
    M: MandateLookup + 'static,
    S: ReliabilityStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/mandates/:mandate_id/rankings",
            post(rankings_handler::<C, M, S>),
        )
        .route("/api/v1/outcomes", post(outcome_handler::<C, M, S>))
        .route(
            "/api/v1/bias-watch/:period_id",
            post(bias_watch_handler::<C, M, S>),
        )
        .with_state(service)
}

pub(crate) async fn rankings_handler<C, M, S>(
    State(service): State<Arc<BiasRankingService<C, M, S>>>,
    Path(mandate_id): Path<String>,
    axum::Json(request): axum::Json<RankingRequest>,
) -> Response
where
    C: CandidateDirectory + 'static,
    M: MandateLookup + 'static,
    S: ReliabilityStore + 'static,
{
    let mandate_id = MandateId(mandate_id);
    let top_n = request.top_n.unwrap_or(DEFAULT_TOP_N);

    match service.evaluate_mandate(&mandate_id, &request.candidate_ids, top_n, Utc::now()) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn outcome_handler<C, M, S>(
    State(service): State<Arc<BiasRankingService<C, M, S>>>,
    axum::Json(event): axum::Json<OutcomeEvent>,
) -> Response
where
    C: CandidateDirectory + 'static,
    M: MandateLookup + 'static,
    S: ReliabilityStore + 'static,
{
    match service.record_outcome(&event) {
        Ok(updated) => {
            let payload = json!({ "updated": updated });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn bias_watch_handler<C, M, S>(
    State(service): State<Arc<BiasRankingService<C, M, S>>>,
    Path(period_id): Path<String>,
    axum::Json(request): axum::Json<BiasWatchRequest>,
) -> Response
where
    C: CandidateDirectory + 'static,
    M: MandateLookup + 'static,
    S: ReliabilityStore + 'static,
{
    let summary = service.bias_watch_summary(&period_id, &request.decisions);
    match export_bias_summary_as_json(&summary) {
        Ok(document) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            document,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn service_error_response(error: RankingServiceError) -> Response {
    let status = match error {
        RankingServiceError::MandateNotFound(_) | RankingServiceError::CandidateNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RankingServiceError::Repository(_) | RankingServiceError::Reliability(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
