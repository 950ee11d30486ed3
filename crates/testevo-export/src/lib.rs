//! Typed output records and the exporter boundary.
//!
//! The pipeline core never owns a file format; it hands typed records to
//! an [`EvolutionExport`] keyed by statistic kind, and only for the
//! kinds the caller declared interest in. Export failures are I/O
//! failures of the run and are never swallowed.

mod records;
mod writer;

pub use records::{
    EvolutionRecord, SmellRecord, SmellStatus, TestRecord, ValueChangeRecord, VersionRecord,
};
pub use writer::{JsonLinesWriter, MemoryWriter, RecordWriter, SharedRecords};

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The statistic families a run can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistics {
    Project,
    Test,
    Smell,
    VariableChanges,
}

impl Statistics {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Test => "test",
            Self::Smell => "smell",
            Self::VariableChanges => "variable_changes",
        }
    }
}

/// Routes records to one writer per requested statistic kind.
#[derive(Default)]
pub struct EvolutionExport {
    writers: BTreeMap<Statistics, Box<dyn RecordWriter>>,
}

impl EvolutionExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, statistics: Statistics, writer: Box<dyn RecordWriter>) {
        self.writers.insert(statistics, writer);
    }

    /// Whether the caller asked for this statistic; stages skip their
    /// whole computation when this is false.
    pub fn contains(&self, statistics: Statistics) -> bool {
        self.writers.contains_key(&statistics)
    }

    /// No-op when the statistic was not requested.
    pub fn export(
        &mut self,
        statistics: Statistics,
        record: &EvolutionRecord,
    ) -> Result<(), ExportError> {
        match self.writers.get_mut(&statistics) {
            Some(writer) => writer.write(record),
            None => Ok(()),
        }
    }

    pub fn export_all(
        &mut self,
        statistics: Statistics,
        records: &[EvolutionRecord],
    ) -> Result<(), ExportError> {
        for record in records {
            self.export(statistics, record)?;
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), ExportError> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrequested_statistics_are_skipped() {
        let mut export = EvolutionExport::new();
        let (writer, records) = MemoryWriter::shared();
        export.register(Statistics::Smell, Box::new(writer));

        assert!(export.contains(Statistics::Smell));
        assert!(!export.contains(Statistics::Project));

        let record = EvolutionRecord::Version(VersionRecord {
            version: "v1".to_owned(),
            date: None,
            number_projects: 0,
            number_test_cases: 0,
            number_keywords: 0,
            number_variables: 0,
            number_lines: 0,
        });
        export.export(Statistics::Project, &record).unwrap();

        assert!(records.lock().unwrap().is_empty());
    }
}
