use serde::{Deserialize, Serialize};

use super::views::BiasWatchSummary;

pub const BIAS_WATCH_SCHEMA_VERSION: &str = "bias-watch-summary/v1";

/// Versioned envelope written for downstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasWatchDocument {
    pub schema_version: String,
    pub summary: BiasWatchSummary,
}

pub fn export_bias_summary_as_json(
    summary: &BiasWatchSummary,
) -> Result<String, BiasWatchExportError> {
    let document = BiasWatchDocument {
        schema_version: BIAS_WATCH_SCHEMA_VERSION.to_string(),
        summary: summary.clone(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn import_bias_summary_from_json(raw: &str) -> Result<BiasWatchSummary, BiasWatchExportError> {
    let document: BiasWatchDocument = serde_json::from_str(raw)?;
    if document.schema_version != BIAS_WATCH_SCHEMA_VERSION {
        return Err(BiasWatchExportError::UnsupportedSchema {
            found: document.schema_version,
        });
    }
    Ok(document.summary)
}

#[derive(Debug, thiserror::Error)]
pub enum BiasWatchExportError {
    #[error("bias-watch document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(
        "unsupported bias-watch schema version '{found}' (expected {})",
        BIAS_WATCH_SCHEMA_VERSION
    )]
    UnsupportedSchema { found: String },
}
