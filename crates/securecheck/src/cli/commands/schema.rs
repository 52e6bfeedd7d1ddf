use anyhow::{Context, Result};
use clap::Args;

use super::{OutputMode, emit_envelope};
use crate::models::{QueryEnvelope, json_schema};

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {}

pub fn run(_args: &SchemaArgs, output: OutputMode) -> Result<()> {
    let schema = json_schema().context("failed to generate stop record schema")?;

    if output.json {
        return emit_envelope(&QueryEnvelope::ok("schema", schema));
    }

    let pretty =
        serde_json::to_string_pretty(&schema).context("failed to encode stop record schema")?;
    println!("{pretty}");
    Ok(())
}
