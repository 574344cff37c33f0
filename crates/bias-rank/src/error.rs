use crate::config::ConfigError;
use crate::ranking::{BiasWatchExportError, OutcomeImportError, RankingServiceError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    OutcomeImport(OutcomeImportError),
    Ranking(RankingServiceError),
    Json(serde_json::Error),
    Export(BiasWatchExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::OutcomeImport(err) => write!(f, "outcome import error: {}", err),
            AppError::Ranking(err) => write!(f, "ranking error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON: {}", err),
            AppError::Export(err) => write!(f, "bias-watch export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::OutcomeImport(err) => Some(err),
            AppError::Ranking(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Ranking(
                RankingServiceError::MandateNotFound(_) | RankingServiceError::CandidateNotFound(_),
            ) => StatusCode::NOT_FOUND,
            AppError::OutcomeImport(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Export(BiasWatchExportError::UnsupportedSchema { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Ranking(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<OutcomeImportError> for AppError {
    fn from(value: OutcomeImportError) -> Self {
        Self::OutcomeImport(value)
    }
}

impl From<RankingServiceError> for AppError {
    fn from(value: RankingServiceError) -> Self {
        Self::Ranking(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BiasWatchExportError> for AppError {
    fn from(value: BiasWatchExportError) -> Self {
        Self::Export(value)
    }
}
