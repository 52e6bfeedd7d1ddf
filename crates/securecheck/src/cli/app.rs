use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    dashboard::DashboardArgs, records::RecordsArgs, reports::ReportsArgs, schema::SchemaArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "securecheck",
    version,
    about = "Traffic-stop log reports and record lookup"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// SQLite database holding the stop table.
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    #[arg(long, global = true, value_name = "NAME")]
    pub table: Option<String>,

    /// Emit a JSON envelope instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the full stop table.
    Dashboard(DashboardArgs),
    /// List or run catalog reports.
    Reports(ReportsArgs),
    /// Look up existing stop records.
    Records(RecordsArgs),
    /// Print the JSON Schema of a stop record.
    Schema(SchemaArgs),
}
