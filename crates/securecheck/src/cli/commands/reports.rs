use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::{OutputMode, emit_envelope, render_data_unavailable};
use crate::catalog::{QueryCatalog, QueryDefinition, Tier};
use crate::config::DatabaseConfig;
use crate::models::{NO_RESULTS_WARNING, QueryEnvelope};
use crate::render::{NO_RESULTS_MESSAGE, render_catalog, render_result_set};
use crate::reports::{ReportError, check_rows};
use crate::sqlite::{ResultSet, SqliteExecutor};

#[derive(Debug, Clone, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReportsCommand {
    /// List report labels in menu order.
    List(ReportsListArgs),
    /// Run one report by label or id.
    Run(ReportsRunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReportsListArgs {
    /// Only list this tier (`advanced` or `complex`).
    #[arg(long, value_name = "TIER")]
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, Args)]
pub struct ReportsRunArgs {
    #[arg(value_name = "TIER")]
    pub tier: Tier,

    /// Report label as listed, or its id.
    #[arg(value_name = "QUERY")]
    pub query: String,
}

pub fn run(args: &ReportsArgs, config: &DatabaseConfig, output: OutputMode) -> Result<()> {
    let catalog = QueryCatalog::for_table(&config.table)?;
    match &args.command {
        ReportsCommand::List(list_args) => run_list(list_args, &catalog, output),
        ReportsCommand::Run(run_args) => run_report(run_args, &catalog, config, output),
    }
}

fn run_list(args: &ReportsListArgs, catalog: &QueryCatalog, output: OutputMode) -> Result<()> {
    let tiers = match args.tier {
        Some(tier) => vec![tier],
        None => Tier::ALL.to_vec(),
    };

    if output.json {
        let listing = tiers
            .iter()
            .map(|tier| {
                let queries = catalog
                    .entries(*tier)
                    .iter()
                    .map(|definition| {
                        json!({
                            "id": definition.id,
                            "label": definition.label,
                            "columns": definition.columns,
                        })
                    })
                    .collect::<Vec<_>>();
                json!({ "tier": tier, "title": tier.title(), "queries": queries })
            })
            .collect::<Vec<_>>();
        let envelope = QueryEnvelope::ok("reports.list", json!({ "tiers": listing }))
            .with_meta("query_count", json!(catalog.len()));
        return emit_envelope(&envelope);
    }

    let sections = tiers
        .iter()
        .map(|tier| render_catalog(*tier, catalog.entries(*tier)))
        .collect::<Vec<_>>();
    println!("{}", sections.join("\n\n"));
    Ok(())
}

/// Executes the report and checks its rows against the report's row type.
fn fetch_rows(
    executor: &SqliteExecutor,
    definition: &QueryDefinition,
) -> Result<ResultSet, ReportError> {
    let result = executor.execute(&definition.sql)?;
    check_rows(definition.id, &result)?;
    Ok(result)
}

fn run_report(
    args: &ReportsRunArgs,
    catalog: &QueryCatalog,
    config: &DatabaseConfig,
    output: OutputMode,
) -> Result<()> {
    let definition = catalog.find(args.tier, &args.query)?;
    tracing::info!(
        tier = %args.tier,
        query_id = definition.id,
        "running catalog report"
    );

    let executor = SqliteExecutor::new(config.clone());
    let (result, unavailable) = match fetch_rows(&executor, definition) {
        Ok(result) => (result, None),
        Err(ReportError::UnknownQuery(error)) => return Err(error.into()),
        Err(ReportError::DataUnavailable(error)) => {
            tracing::warn!(
                query_id = definition.id,
                reason = error.reason(),
                "report data unavailable: {error}"
            );
            (ResultSet::default(), Some(error))
        }
    };
    let no_results = unavailable.is_none() && result.is_empty() && args.tier == Tier::Advanced;

    if output.json {
        let mut envelope = QueryEnvelope::ok(
            "reports.run",
            json!({ "columns": definition.columns, "rows": result.rows }),
        )
        .with_meta("tier", json!(args.tier))
        .with_meta("query_id", json!(definition.id))
        .with_meta("label", json!(definition.label))
        .with_meta("row_count", json!(result.len()));
        if let Some(error) = &unavailable {
            envelope = envelope.with_data_unavailable(error);
        }
        if no_results {
            envelope = envelope.with_warning(NO_RESULTS_WARNING, NO_RESULTS_MESSAGE);
        }
        return emit_envelope(&envelope);
    }

    println!("{}: {}", args.tier.title(), definition.label);
    if let Some(error) = &unavailable {
        println!("{}", render_data_unavailable(error));
        return Ok(());
    }
    if no_results {
        println!("{NO_RESULTS_MESSAGE}");
        return Ok(());
    }
    println!("{}", render_result_set(&result));

    Ok(())
}
