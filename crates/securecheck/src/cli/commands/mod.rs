pub mod dashboard;
pub mod records;
pub mod reports;
pub mod schema;

use anyhow::{Context, Result};

use crate::models::QueryEnvelope;
use crate::snapshot::StopLogSnapshot;
use crate::sqlite::{DataUnavailableError, SqliteExecutor};

/// Output options shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputMode {
    pub json: bool,
}

pub(crate) fn emit_envelope(envelope: &QueryEnvelope) -> Result<()> {
    let encoded = envelope
        .to_json_line()
        .context("failed to encode json envelope")?;
    println!("{encoded}");
    Ok(())
}

pub(crate) fn render_data_unavailable(error: &DataUnavailableError) -> String {
    format!("Warning: data unavailable: {error}")
}

/// Loads the view's snapshot. A data failure degrades to an empty snapshot
/// and is handed back so the caller can report it inline.
pub(crate) fn load_snapshot(
    executor: &SqliteExecutor,
) -> (StopLogSnapshot, Option<DataUnavailableError>) {
    match StopLogSnapshot::load(executor) {
        Ok(snapshot) => (snapshot, None),
        Err(error) => {
            tracing::warn!(reason = error.reason(), "stop table unavailable: {error}");
            (StopLogSnapshot::default(), Some(error))
        }
    }
}
