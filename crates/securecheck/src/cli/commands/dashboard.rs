use std::num::NonZeroUsize;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{OutputMode, emit_envelope, load_snapshot, render_data_unavailable};
use crate::config::DatabaseConfig;
use crate::models::QueryEnvelope;
use crate::render::render_result_set;
use crate::sqlite::SqliteExecutor;

#[derive(Debug, Clone, Args)]
pub struct DashboardArgs {
    /// Show at most this many rows.
    #[arg(long)]
    pub row_cap: Option<NonZeroUsize>,
}

pub fn run(args: &DashboardArgs, config: &DatabaseConfig, output: OutputMode) -> Result<()> {
    let executor = SqliteExecutor::new(config.clone());
    let (snapshot, unavailable) = load_snapshot(&executor);
    let table = snapshot.to_result_set(args.row_cap.map(NonZeroUsize::get));
    let truncated = table.len() < snapshot.len();

    if output.json {
        let mut envelope = QueryEnvelope::ok(
            "dashboard",
            json!({ "columns": table.columns, "rows": table.rows }),
        )
        .with_meta("table", json!(config.table.as_str()))
        .with_meta("row_count", json!(table.len()))
        .with_meta("total_rows", json!(snapshot.len()))
        .with_meta("truncated", json!(truncated))
        .with_meta("loaded_at_utc", json!(snapshot.loaded_at_utc()));
        if let Some(error) = &unavailable {
            envelope = envelope.with_data_unavailable(error);
        }
        return emit_envelope(&envelope);
    }

    println!("Police Logs Overview ({})", config.table);
    if let Some(error) = &unavailable {
        println!("{}", render_data_unavailable(error));
    }
    println!("{}", render_result_set(&table));
    if truncated {
        println!("showing {} of {} rows", table.len(), snapshot.len());
    }

    Ok(())
}
