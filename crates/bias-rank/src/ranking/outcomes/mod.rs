mod parser;

use super::domain::OutcomeEvent;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum OutcomeImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for OutcomeImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeImportError::Io(err) => write!(f, "failed to read outcome log: {}", err),
            OutcomeImportError::Csv(err) => write!(f, "invalid outcome log CSV data: {}", err),
        }
    }
}

impl std::error::Error for OutcomeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutcomeImportError::Io(err) => Some(err),
            OutcomeImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for OutcomeImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for OutcomeImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Outcome events read from an outcome-logging export.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeImport {
    pub events: Vec<OutcomeEvent>,
    /// Rows dropped for an unknown stage/result, blank ids or an unparseable timestamp.
    pub skipped_rows: usize,
}

/// Reads outcome-log CSV exports into append-only [`OutcomeEvent`]s.
pub struct OutcomeLogImporter;

impl OutcomeLogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<OutcomeImport, OutcomeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<OutcomeImport, OutcomeImportError> {
        let parsed = parser::parse_outcomes(reader)?;
        Ok(OutcomeImport {
            events: parsed.events,
            skipped_rows: parsed.skipped_rows,
        })
    }
}
