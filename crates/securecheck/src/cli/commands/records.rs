use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use serde_json::json;

use super::{OutputMode, emit_envelope, load_snapshot, render_data_unavailable};
use crate::config::DatabaseConfig;
use crate::matcher::{MatchConstraints, MatchOutcome, NO_MATCH_MESSAGE};
use crate::models::QueryEnvelope;
use crate::render::{render_candidates, render_match_outcome};
use crate::sqlite::SqliteExecutor;

#[derive(Debug, Clone, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RecordsCommand {
    /// Find the first stop matching all eight fields.
    Match(MatchArgs),
    /// List the values present in each match field.
    Candidates,
}

#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub stop_date: String,

    #[arg(long)]
    pub country_name: String,

    #[arg(long)]
    pub driver_gender: String,

    #[arg(long)]
    pub driver_age: i64,

    #[arg(
        long,
        value_name = "0|1",
        required = true,
        action = ArgAction::Set,
        value_parser = parse_stored_flag
    )]
    pub search_conducted: bool,

    #[arg(
        long,
        value_name = "0|1",
        required = true,
        action = ArgAction::Set,
        value_parser = parse_stored_flag
    )]
    pub drugs_related_stop: bool,

    #[arg(long)]
    pub stop_duration: String,

    #[arg(long)]
    pub vehicle_number: String,
}

impl MatchArgs {
    #[must_use]
    pub fn constraints(&self) -> MatchConstraints {
        MatchConstraints {
            stop_date: self.stop_date.clone(),
            country_name: self.country_name.clone(),
            driver_gender: self.driver_gender.clone(),
            driver_age: self.driver_age,
            search_conducted: self.search_conducted,
            drugs_related_stop: self.drugs_related_stop,
            stop_duration: self.stop_duration.clone(),
            vehicle_number: self.vehicle_number.clone(),
        }
    }
}

pub fn parse_stored_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(format!("expected 0 or 1, got `{other}`")),
    }
}

pub fn run(args: &RecordsArgs, config: &DatabaseConfig, output: OutputMode) -> Result<()> {
    let executor = SqliteExecutor::new(config.clone());
    match &args.command {
        RecordsCommand::Match(match_args) => run_match(match_args, &executor, output),
        RecordsCommand::Candidates => run_candidates(&executor, output),
    }
}

fn run_match(args: &MatchArgs, executor: &SqliteExecutor, output: OutputMode) -> Result<()> {
    let (snapshot, unavailable) = load_snapshot(executor);
    let constraints = args.constraints();
    let outcome = snapshot.lookup(&constraints);
    tracing::info!(
        matched = outcome.is_found(),
        records = snapshot.len(),
        "record lookup finished"
    );

    if output.json {
        let mut envelope = QueryEnvelope::ok(
            "records.match",
            json!({ "constraints": constraints, "outcome": outcome }),
        )
        .with_meta("records_searched", json!(snapshot.len()));
        if let Some(error) = &unavailable {
            envelope = envelope.with_data_unavailable(error);
        }
        if matches!(outcome, MatchOutcome::NoMatch) {
            envelope = envelope.with_meta("message", json!(NO_MATCH_MESSAGE));
        }
        return emit_envelope(&envelope);
    }

    if let Some(error) = &unavailable {
        println!("{}", render_data_unavailable(error));
    }
    println!("{}", render_match_outcome(&outcome));

    Ok(())
}

fn run_candidates(executor: &SqliteExecutor, output: OutputMode) -> Result<()> {
    let (snapshot, unavailable) = load_snapshot(executor);
    let candidates = snapshot.candidates();

    if output.json {
        let mut envelope = QueryEnvelope::ok("records.candidates", json!(candidates))
            .with_meta("records_scanned", json!(snapshot.len()));
        if let Some(error) = &unavailable {
            envelope = envelope.with_data_unavailable(error);
        }
        return emit_envelope(&envelope);
    }

    if let Some(error) = &unavailable {
        println!("{}", render_data_unavailable(error));
    }
    println!("{}", render_candidates(&candidates));

    Ok(())
}
