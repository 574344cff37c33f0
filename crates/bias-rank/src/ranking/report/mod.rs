mod export;
mod summary;
pub mod views;

pub use export::{
    export_bias_summary_as_json, import_bias_summary_from_json, BiasWatchDocument,
    BiasWatchExportError, BIAS_WATCH_SCHEMA_VERSION,
};
pub use summary::build_bias_watch_summary;
pub use views::{
    BiasWatchSummary, MandateBiasEntry, PeriodWindow, RankingDecision, ReportingPeriod,
    SourceObservation, SourceTypeStat,
};
