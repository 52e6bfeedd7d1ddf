//! Typed result rows, one struct per catalog report.
//!
//! Field names match the report's output columns, so rows decode straight
//! from [`ResultSet`](crate::sqlite::ResultSet). Grouping keys come from
//! nullable columns and decode as `Option`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::{QueryCatalog, UnknownQueryError};
use crate::models::deserialize_whole_number;
use crate::sqlite::{DataUnavailableError, ResultSet, SqliteExecutor};

pub trait ReportRow: DeserializeOwned {
    /// Catalog id of the report producing this row shape.
    const QUERY_ID: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    UnknownQuery(#[from] UnknownQueryError),

    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailableError),
}

pub fn run_report<R: ReportRow>(
    executor: &SqliteExecutor,
    catalog: &QueryCatalog,
) -> Result<Vec<R>, ReportError> {
    let definition = catalog.by_id(R::QUERY_ID)?;
    let rows = executor.execute(&definition.sql)?.decode()?;
    Ok(rows)
}

fn decoded_len<R: ReportRow>(result: &ResultSet) -> Result<usize, DataUnavailableError> {
    result.decode::<R>().map(|rows| rows.len())
}

/// Decodes `result` through the row type of report `query_id` and returns the
/// row count. Fails when the rows no longer fit that shape.
pub fn check_rows(query_id: &str, result: &ResultSet) -> Result<usize, ReportError> {
    let decoded = match query_id {
        DrugStopVehicle::QUERY_ID => decoded_len::<DrugStopVehicle>(result),
        SearchedVehicle::QUERY_ID => decoded_len::<SearchedVehicle>(result),
        AgeArrestRate::QUERY_ID => decoded_len::<AgeArrestRate>(result),
        CountryGenderCount::QUERY_ID => decoded_len::<CountryGenderCount>(result),
        RaceGenderSearchRate::QUERY_ID => decoded_len::<RaceGenderSearchRate>(result),
        HourlyStopCount::QUERY_ID => decoded_len::<HourlyStopCount>(result),
        ViolationAverageDuration::QUERY_ID => decoded_len::<ViolationAverageDuration>(result),
        TimeOfDayArrestRate::QUERY_ID => decoded_len::<TimeOfDayArrestRate>(result),
        ViolationActionCounts::QUERY_ID => decoded_len::<ViolationActionCounts>(result),
        YoungDriverViolation::QUERY_ID => decoded_len::<YoungDriverViolation>(result),
        ViolationActionRate::QUERY_ID => decoded_len::<ViolationActionRate>(result),
        CountryDrugStops::QUERY_ID => decoded_len::<CountryDrugStops>(result),
        CountryViolationArrestRate::QUERY_ID => decoded_len::<CountryViolationArrestRate>(result),
        CountrySearchStops::QUERY_ID => decoded_len::<CountrySearchStops>(result),
        YearlyCountryArrests::QUERY_ID => decoded_len::<YearlyCountryArrests>(result),
        AgeRaceViolationCount::QUERY_ID => decoded_len::<AgeRaceViolationCount>(result),
        TimePeriodStopCount::QUERY_ID => decoded_len::<TimePeriodStopCount>(result),
        ViolationRateRank::QUERY_ID => decoded_len::<ViolationRateRank>(result),
        CountryDemographicCount::QUERY_ID => decoded_len::<CountryDemographicCount>(result),
        ViolationArrestRate::QUERY_ID => decoded_len::<ViolationArrestRate>(result),
        other => {
            return Err(ReportError::UnknownQuery(UnknownQueryError {
                tier: "catalog".to_string(),
                key: other.to_string(),
            }));
        }
    };
    Ok(decoded?)
}

// Advanced tier.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugStopVehicle {
    pub vehicle_number: Option<String>,
    pub stop_count: i64,
}

impl ReportRow for DrugStopVehicle {
    const QUERY_ID: &'static str = "top_drug_vehicles";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchedVehicle {
    pub vehicle_number: Option<String>,
    pub search_count: i64,
}

impl ReportRow for SearchedVehicle {
    const QUERY_ID: &'static str = "most_searched_vehicles";
}

/// `is_arrested` here is the arrest percentage for the age, not a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeArrestRate {
    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub driver_age: Option<i64>,
    pub is_arrested: f64,
}

impl ReportRow for AgeArrestRate {
    const QUERY_ID: &'static str = "arrest_rate_by_age";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryGenderCount {
    pub country_name: Option<String>,
    pub driver_gender: Option<String>,
    pub stop_count: i64,
}

impl ReportRow for CountryGenderCount {
    const QUERY_ID: &'static str = "gender_by_country";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceGenderSearchRate {
    pub driver_race: Option<String>,
    pub driver_gender: Option<String>,
    pub search_rate: f64,
}

impl ReportRow for RaceGenderSearchRate {
    const QUERY_ID: &'static str = "search_rate_by_race_gender";
}

/// Hour of day parsed from the leading `H` or `HH` of `stop_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyStopCount {
    pub hour: Option<i64>,
    pub stop_count: i64,
}

impl ReportRow for HourlyStopCount {
    const QUERY_ID: &'static str = "stops_by_hour";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationAverageDuration {
    pub violation: Option<String>,
    pub avg_duration: Option<f64>,
}

impl ReportRow for ViolationAverageDuration {
    const QUERY_ID: &'static str = "avg_duration_by_violation";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayArrestRate {
    pub time_of_day: String,
    pub arrest_rate: f64,
}

impl ReportRow for TimeOfDayArrestRate {
    const QUERY_ID: &'static str = "night_arrest_rate";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationActionCounts {
    pub violation: Option<String>,
    pub search_count: i64,
    pub arrest_count: i64,
}

impl ReportRow for ViolationActionCounts {
    const QUERY_ID: &'static str = "violation_search_arrest_counts";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungDriverViolation {
    pub violation: Option<String>,
    pub stop_count: i64,
}

impl ReportRow for YoungDriverViolation {
    const QUERY_ID: &'static str = "young_driver_violations";
}

/// `action_rate` is the fraction of stops with a search or an arrest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationActionRate {
    pub violation: Option<String>,
    pub total_stops: i64,
    pub action_rate: f64,
}

impl ReportRow for ViolationActionRate {
    const QUERY_ID: &'static str = "violation_action_rate";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDrugStops {
    pub country_name: Option<String>,
    pub drug_related_stops: i64,
}

impl ReportRow for CountryDrugStops {
    const QUERY_ID: &'static str = "drug_stops_by_country";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryViolationArrestRate {
    pub country_name: Option<String>,
    pub violation_raw: Option<String>,
    pub arrest_rate: f64,
}

impl ReportRow for CountryViolationArrestRate {
    const QUERY_ID: &'static str = "arrest_rate_by_country_violation";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySearchStops {
    pub country_name: Option<String>,
    pub search_stop_count: i64,
}

impl ReportRow for CountrySearchStops {
    const QUERY_ID: &'static str = "search_stops_by_country";
}

// Complex tier.

/// `running_arrests` accumulates `arrests` per country in year order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyCountryArrests {
    pub country_name: Option<String>,
    pub year: Option<i64>,
    pub total_stops: i64,
    pub arrests: i64,
    pub running_arrests: i64,
}

impl ReportRow for YearlyCountryArrests {
    const QUERY_ID: &'static str = "yearly_arrests_by_country";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRaceViolationCount {
    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub driver_age: Option<i64>,
    pub driver_race: Option<String>,
    pub violation: Option<String>,
    pub stop_count: i64,
}

impl ReportRow for AgeRaceViolationCount {
    const QUERY_ID: &'static str = "violation_trends_by_age_race";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodStopCount {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub hour: Option<i64>,
    pub stop_count: i64,
}

impl ReportRow for TimePeriodStopCount {
    const QUERY_ID: &'static str = "stops_by_time_period";
}

/// Rates are percentages; ties in their sum share a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRateRank {
    pub violation: Option<String>,
    pub search_rate: f64,
    pub arrest_rate: f64,
    pub rank_order: i64,
}

impl ReportRow for ViolationRateRank {
    const QUERY_ID: &'static str = "violation_search_arrest_rank";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDemographicCount {
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub driver_age: Option<i64>,
    pub driver_gender: Option<String>,
    pub driver_race: Option<String>,
    pub stop_count: i64,
}

impl ReportRow for CountryDemographicCount {
    const QUERY_ID: &'static str = "demographics_by_country";
}

/// `arrest_rate` is a fraction in `[0, 1]`, unlike the percentage reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationArrestRate {
    pub violation: Option<String>,
    pub total: i64,
    pub arrests: i64,
    pub arrest_rate: f64,
}

impl ReportRow for ViolationArrestRate {
    const QUERY_ID: &'static str = "top_violation_arrest_rates";
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::{Map, json};

    use super::*;
    use crate::catalog::Tier;

    fn report_ids() -> Vec<&'static str> {
        vec![
            DrugStopVehicle::QUERY_ID,
            SearchedVehicle::QUERY_ID,
            AgeArrestRate::QUERY_ID,
            CountryGenderCount::QUERY_ID,
            RaceGenderSearchRate::QUERY_ID,
            HourlyStopCount::QUERY_ID,
            ViolationAverageDuration::QUERY_ID,
            TimeOfDayArrestRate::QUERY_ID,
            ViolationActionCounts::QUERY_ID,
            YoungDriverViolation::QUERY_ID,
            ViolationActionRate::QUERY_ID,
            CountryDrugStops::QUERY_ID,
            CountryViolationArrestRate::QUERY_ID,
            CountrySearchStops::QUERY_ID,
            YearlyCountryArrests::QUERY_ID,
            AgeRaceViolationCount::QUERY_ID,
            TimePeriodStopCount::QUERY_ID,
            ViolationRateRank::QUERY_ID,
            CountryDemographicCount::QUERY_ID,
            ViolationArrestRate::QUERY_ID,
        ]
    }

    fn single_row(cells: serde_json::Value) -> ResultSet {
        let row = cells.as_object().cloned().unwrap_or_else(Map::new);
        ResultSet {
            columns: row.keys().cloned().collect(),
            rows: vec![row],
        }
    }

    #[test]
    fn every_catalog_entry_has_exactly_one_row_type() {
        let catalog = QueryCatalog::builtin().expect("builtin catalog should be valid");
        let typed = report_ids().into_iter().collect::<BTreeSet<_>>();
        let declared = Tier::ALL
            .into_iter()
            .flat_map(|tier| catalog.entries(tier))
            .map(|definition| definition.id)
            .collect::<BTreeSet<_>>();

        assert_eq!(typed.len(), report_ids().len(), "row types share an id");
        assert_eq!(typed, declared);
    }

    #[test]
    fn every_catalog_id_dispatches_to_a_row_type() {
        for id in report_ids() {
            let count = check_rows(id, &ResultSet::default())
                .unwrap_or_else(|error| panic!("{id} did not dispatch: {error}"));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn check_rows_accepts_null_keys_and_real_ages() {
        let result = single_row(json!({
            "country_name": null,
            "driver_age": 30.0,
            "driver_gender": "M",
            "driver_race": null,
            "stop_count": 2
        }));
        assert_eq!(
            check_rows(CountryDemographicCount::QUERY_ID, &result).expect("row should fit"),
            1
        );
    }

    #[test]
    fn check_rows_rejects_drifted_rows() {
        let result = single_row(json!({"vehicle_number": "X1", "stop_count": "many"}));
        let error = check_rows(DrugStopVehicle::QUERY_ID, &result)
            .expect_err("a text count should not decode");
        match error {
            ReportError::DataUnavailable(error) => assert_eq!(error.reason(), "row_decode_failed"),
            other => panic!("expected decode failure, got {other:?}"),
        }
    }

    #[test]
    fn check_rows_rejects_unknown_ids() {
        let error = check_rows("no_such_report", &ResultSet::default())
            .expect_err("unknown id should fail");
        assert!(matches!(error, ReportError::UnknownQuery(_)));
    }
}
