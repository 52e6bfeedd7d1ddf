//! Exact-match lookup of a stop record by eight fields.
//!
//! This is a lookup against observed rows, not a prediction: the first row in
//! table order whose eight fields all equal the constraints wins.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{StopRecord, stored_flag};

pub const NO_MATCH_MESSAGE: &str = "No matching row found. Check your inputs.";

/// Stands in for a NULL cell in the match summary.
pub const UNKNOWN_VALUE: &str = "unknown";

pub const MATCH_FIELDS: &[&str] = &[
    "stop_date",
    "country_name",
    "driver_gender",
    "driver_age",
    "search_conducted",
    "drugs_related_stop",
    "stop_duration",
    "vehicle_number",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConstraints {
    pub stop_date: String,
    pub country_name: String,
    pub driver_gender: String,
    pub driver_age: i64,
    pub search_conducted: bool,
    pub drugs_related_stop: bool,
    pub stop_duration: String,
    pub vehicle_number: String,
}

impl MatchConstraints {
    /// Constraints copied from the eight matched fields of `record`. NULL
    /// cells become empty strings or age `0`, which never match a NULL cell.
    #[must_use]
    pub fn from_record(record: &StopRecord) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            stop_date: text(&record.stop_date),
            country_name: text(&record.country_name),
            driver_gender: text(&record.driver_gender),
            driver_age: record.driver_age.unwrap_or_default(),
            search_conducted: record.search_conducted,
            drugs_related_stop: record.drugs_related_stop,
            stop_duration: text(&record.stop_duration),
            vehicle_number: text(&record.vehicle_number),
        }
    }

    /// Strings compare byte-for-byte; no trimming or case folding. A NULL
    /// cell never equals a supplied value.
    #[must_use]
    pub fn matches(&self, record: &StopRecord) -> bool {
        record.stop_date.as_deref() == Some(self.stop_date.as_str())
            && record.country_name.as_deref() == Some(self.country_name.as_str())
            && record.driver_gender.as_deref() == Some(self.driver_gender.as_str())
            && record.driver_age == Some(self.driver_age)
            && stored_flag(record.search_conducted) == stored_flag(self.search_conducted)
            && stored_flag(record.drugs_related_stop) == stored_flag(self.drugs_related_stop)
            && record.stop_duration.as_deref() == Some(self.stop_duration.as_str())
            && record.vehicle_number.as_deref() == Some(self.vehicle_number.as_str())
    }
}

#[must_use]
pub fn find_match<'a>(
    table: &'a [StopRecord],
    constraints: &MatchConstraints,
) -> Option<&'a StopRecord> {
    table.iter().find(|record| constraints.matches(record))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub outcome: String,
    pub violation: String,
    pub narrative: String,
    pub stop_duration: String,
    pub vehicle_number: String,
}

impl MatchSummary {
    #[must_use]
    pub fn for_record(record: &StopRecord) -> Self {
        let age = record
            .driver_age
            .map_or_else(|| UNKNOWN_VALUE.to_string(), |age| age.to_string());
        Self {
            outcome: or_unknown(&record.stop_outcome),
            violation: or_unknown(&record.violation),
            narrative: format!(
                "A {age}-year-old {} driver in {} was stopped on {}.",
                or_unknown(&record.driver_gender),
                or_unknown(&record.country_name),
                or_unknown(&record.stop_date)
            ),
            stop_duration: or_unknown(&record.stop_duration),
            vehicle_number: or_unknown(&record.vehicle_number),
        }
    }
}

fn or_unknown(value: &Option<String>) -> String {
    value.as_deref().unwrap_or(UNKNOWN_VALUE).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Found {
        record: StopRecord,
        summary: MatchSummary,
    },
    NoMatch,
}

impl MatchOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

#[must_use]
pub fn lookup(table: &[StopRecord], constraints: &MatchConstraints) -> MatchOutcome {
    match find_match(table, constraints) {
        Some(record) => MatchOutcome::Found {
            record: record.clone(),
            summary: MatchSummary::for_record(record),
        },
        None => MatchOutcome::NoMatch,
    }
}

/// Distinct sorted values of each matched field, for populating a selector.
/// NULL cells are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchCandidates {
    pub stop_date: BTreeSet<String>,
    pub country_name: BTreeSet<String>,
    pub driver_gender: BTreeSet<String>,
    pub driver_age: BTreeSet<i64>,
    pub search_conducted: BTreeSet<i64>,
    pub drugs_related_stop: BTreeSet<i64>,
    pub stop_duration: BTreeSet<String>,
    pub vehicle_number: BTreeSet<String>,
}

impl MatchCandidates {
    #[must_use]
    pub fn from_records(records: &[StopRecord]) -> Self {
        let mut candidates = Self::default();
        for record in records {
            candidates.stop_date.extend(record.stop_date.clone());
            candidates.country_name.extend(record.country_name.clone());
            candidates.driver_gender.extend(record.driver_gender.clone());
            candidates.driver_age.extend(record.driver_age);
            candidates
                .search_conducted
                .insert(stored_flag(record.search_conducted));
            candidates
                .drugs_related_stop
                .insert(stored_flag(record.drugs_related_stop));
            candidates.stop_duration.extend(record.stop_duration.clone());
            candidates.vehicle_number.extend(record.vehicle_number.clone());
        }
        candidates
    }

    /// `(field, rendered values)` pairs in form order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, Vec<String>)> {
        fn rendered<T: ToString>(values: &BTreeSet<T>) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }

        vec![
            ("stop_date", rendered(&self.stop_date)),
            ("country_name", rendered(&self.country_name)),
            ("driver_gender", rendered(&self.driver_gender)),
            ("driver_age", rendered(&self.driver_age)),
            ("search_conducted", rendered(&self.search_conducted)),
            ("drugs_related_stop", rendered(&self.drugs_related_stop)),
            ("stop_duration", rendered(&self.stop_duration)),
            ("vehicle_number", rendered(&self.vehicle_number)),
        ]
    }
}
