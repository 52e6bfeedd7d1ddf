//! Plain-text rendering for terminal output.

use serde_json::Value;

use crate::catalog::{QueryDefinition, Tier};
use crate::matcher::{MatchCandidates, MatchOutcome, NO_MATCH_MESSAGE};
use crate::sqlite::ResultSet;

pub const NO_RESULTS_MESSAGE: &str = "No results found.";

#[must_use]
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Aligned `col | col` table with a dashed header rule.
#[must_use]
pub fn render_result_set(result: &ResultSet) -> String {
    let cells = result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .map(|column| render_cell(row.get(column)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = result
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let mut lines = vec![render_line(&result.columns, &widths, " | ")];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(cells.iter().map(|row| render_line(row, &widths, " | ")));
    lines.push(format!("({} rows)", result.len()));
    lines.join("\n")
}

fn render_line(values: &[String], widths: &[usize], separator: &str) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join(separator)
        .trim_end()
        .to_string()
}

#[must_use]
pub fn render_catalog(tier: Tier, definitions: &[QueryDefinition]) -> String {
    let mut lines = vec![format!("{} ({})", tier.title(), tier.key())];
    for (position, definition) in definitions.iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} [{}]",
            position + 1,
            definition.label,
            definition.id
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn render_match_outcome(outcome: &MatchOutcome) -> String {
    match outcome {
        MatchOutcome::NoMatch => NO_MATCH_MESSAGE.to_string(),
        MatchOutcome::Found { summary, .. } => [
            "Match found.".to_string(),
            format!("Outcome: {}", summary.outcome),
            format!("Violation: {}", summary.violation),
            String::new(),
            summary.narrative.clone(),
            format!("Stop duration: {}.", summary.stop_duration),
            format!("Vehicle number: {}.", summary.vehicle_number),
        ]
        .join("\n"),
    }
}

#[must_use]
pub fn render_candidates(candidates: &MatchCandidates) -> String {
    candidates
        .fields()
        .into_iter()
        .map(|(field, values)| format!("{field}: {}", values.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}
