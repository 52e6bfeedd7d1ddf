#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use securecheck::catalog::{CatalogIntegrityError, UnknownQueryError};
use securecheck::cli::app::{Cli, Command, RuntimeArgs};
use securecheck::cli::commands::{self, OutputMode};
use securecheck::config::DatabaseConfig;
use securecheck::models::QueryEnvelope;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_CATALOG_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

const LOG_FILTER_ENV: &str = "SECURECHECK_LOG";
const DEFAULT_LOG_FILTER: &str = "securecheck=warn";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    let command_name = command_name(&cli.command);
    let json_output = cli.runtime.json;
    tracing::info!(command = command_name, "starting");

    match execute(cli) {
        Ok(()) => {
            tracing::info!(command = command_name, exit_code = EXIT_SUCCESS, "completed");
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            tracing::error!(command = command_name, exit_code, "failed");
            if json_output {
                emit_failure_envelope(command_name, exit_code, &error);
            }
            eprintln!("securecheck: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let output = OutputMode {
        json: cli.runtime.json,
    };
    match cli.command {
        Command::Dashboard(args) => {
            let config = resolve_database_config(&cli.runtime)?;
            commands::dashboard::run(&args, &config, output)
        }
        Command::Reports(args) => {
            let config = resolve_database_config(&cli.runtime)?;
            commands::reports::run(&args, &config, output)
        }
        Command::Records(args) => {
            let config = resolve_database_config(&cli.runtime)?;
            commands::records::run(&args, &config, output)
        }
        Command::Schema(args) => commands::schema::run(&args, output),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<UnknownQueryError>().is_some()
        || error.downcast_ref::<CatalogIntegrityError>().is_some()
    {
        EXIT_CATALOG_FAILURE
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn emit_failure_envelope(command_name: &str, exit_code: i32, error: &anyhow::Error) {
    let code = if error.downcast_ref::<UnknownQueryError>().is_some() {
        "unknown_query"
    } else if error.downcast_ref::<CatalogIntegrityError>().is_some() {
        "catalog_integrity"
    } else {
        "runtime_failure"
    };
    let envelope = QueryEnvelope::error(command_name, code, format!("{error:#}"))
        .with_meta("exit_code", json!(exit_code));
    match envelope.to_json_line() {
        Ok(line) => println!("{line}"),
        Err(encode_error) => tracing::error!("failed to encode failure envelope: {encode_error}"),
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Dashboard(_) => "dashboard",
        Command::Reports(_) => "reports",
        Command::Records(_) => "records",
        Command::Schema(_) => "schema",
    }
}

fn resolve_database_config(args: &RuntimeArgs) -> Result<DatabaseConfig> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    securecheck::config::resolve_database_config(
        &home_dir,
        &cwd,
        args.database.as_deref(),
        args.table.as_deref(),
    )
}
