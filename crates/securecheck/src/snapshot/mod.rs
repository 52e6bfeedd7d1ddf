//! The in-memory copy of the stop table held for one view.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::matcher::{MatchCandidates, MatchConstraints, MatchOutcome, lookup};
use crate::models::{STOP_RECORD_COLUMNS, StopRecord};
use crate::sqlite::{DataUnavailableError, ResultSet, SqliteExecutor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopLogSnapshot {
    records: Vec<StopRecord>,
    loaded_at_utc: Option<String>,
}

impl StopLogSnapshot {
    pub fn load(executor: &SqliteExecutor) -> Result<Self, DataUnavailableError> {
        let records = executor.load_table()?;
        tracing::info!(records = records.len(), "loaded stop table snapshot");
        Ok(Self {
            records,
            loaded_at_utc: Some(now_utc()),
        })
    }

    #[must_use]
    pub fn from_records(records: Vec<StopRecord>) -> Self {
        Self {
            records,
            loaded_at_utc: None,
        }
    }

    /// Replaces the held rows with a fresh load. On failure the previous rows
    /// are kept.
    pub fn reload(&mut self, executor: &SqliteExecutor) -> Result<(), DataUnavailableError> {
        *self = Self::load(executor)?;
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn loaded_at_utc(&self) -> Option<&str> {
        self.loaded_at_utc.as_deref()
    }

    #[must_use]
    pub fn lookup(&self, constraints: &MatchConstraints) -> MatchOutcome {
        lookup(&self.records, constraints)
    }

    #[must_use]
    pub fn candidates(&self) -> MatchCandidates {
        MatchCandidates::from_records(&self.records)
    }

    /// Table view of the first `row_cap` rows, or all rows when `None`.
    #[must_use]
    pub fn to_result_set(&self, row_cap: Option<usize>) -> ResultSet {
        let limit = row_cap.unwrap_or(self.records.len());
        ResultSet {
            columns: STOP_RECORD_COLUMNS
                .iter()
                .map(|column| (*column).to_string())
                .collect(),
            rows: self
                .records
                .iter()
                .take(limit)
                .map(StopRecord::to_row)
                .collect(),
        }
    }
}

fn now_utc() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
