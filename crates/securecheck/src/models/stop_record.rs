use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value, json};

/// Column order of the `policelog` table as rendered by the dashboard.
pub const STOP_RECORD_COLUMNS: &[&str] = &[
    "stop_date",
    "stop_time",
    "country_name",
    "driver_gender",
    "driver_age_raw",
    "driver_age",
    "driver_race",
    "violation_raw",
    "violation",
    "search_conducted",
    "search_type",
    "stop_outcome",
    "is_arrested",
    "stop_duration",
    "drugs_related_stop",
    "vehicle_number",
];

/// One row of the traffic-stop table.
///
/// Any cell may be NULL except the three flags. Boolean-coded columns are
/// stored as `0`/`1`; decoding rejects any other stored value. Whole-number
/// columns also accept integral reals such as `30.0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StopRecord {
    #[serde(default)]
    pub stop_date: Option<String>,

    #[serde(default)]
    pub stop_time: Option<String>,

    #[serde(default)]
    pub country_name: Option<String>,

    #[serde(default)]
    pub driver_gender: Option<String>,

    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub driver_age_raw: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub driver_age: Option<i64>,

    #[serde(default)]
    pub driver_race: Option<String>,

    #[serde(default)]
    pub violation_raw: Option<String>,

    #[serde(default)]
    pub violation: Option<String>,

    #[serde(deserialize_with = "deserialize_stored_flag")]
    pub search_conducted: bool,

    #[serde(default)]
    pub search_type: Option<String>,

    #[serde(default)]
    pub stop_outcome: Option<String>,

    #[serde(deserialize_with = "deserialize_stored_flag")]
    pub is_arrested: bool,

    #[serde(default)]
    pub stop_duration: Option<String>,

    #[serde(deserialize_with = "deserialize_stored_flag")]
    pub drugs_related_stop: bool,

    #[serde(default)]
    pub vehicle_number: Option<String>,
}

impl StopRecord {
    /// Row view keyed by column name, with flags in their stored `0`/`1` form
    /// and NULL cells as `null`.
    #[must_use]
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("stop_date".to_string(), json!(self.stop_date));
        row.insert("stop_time".to_string(), json!(self.stop_time));
        row.insert("country_name".to_string(), json!(self.country_name));
        row.insert("driver_gender".to_string(), json!(self.driver_gender));
        row.insert("driver_age_raw".to_string(), json!(self.driver_age_raw));
        row.insert("driver_age".to_string(), json!(self.driver_age));
        row.insert("driver_race".to_string(), json!(self.driver_race));
        row.insert("violation_raw".to_string(), json!(self.violation_raw));
        row.insert("violation".to_string(), json!(self.violation));
        row.insert(
            "search_conducted".to_string(),
            json!(stored_flag(self.search_conducted)),
        );
        row.insert("search_type".to_string(), json!(self.search_type));
        row.insert("stop_outcome".to_string(), json!(self.stop_outcome));
        row.insert("is_arrested".to_string(), json!(stored_flag(self.is_arrested)));
        row.insert("stop_duration".to_string(), json!(self.stop_duration));
        row.insert(
            "drugs_related_stop".to_string(),
            json!(stored_flag(self.drugs_related_stop)),
        );
        row.insert("vehicle_number".to_string(), json!(self.vehicle_number));
        row
    }
}

#[must_use]
pub fn stored_flag(flag: bool) -> i64 {
    i64::from(flag)
}

/// Integer value of a stored number, accepting reals with no fractional part.
fn whole_number(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < 9.0e15)
            .map(|value| value as i64)
    })
}

/// Decodes a nullable whole-number column. Integral reals such as `30.0`
/// are accepted; fractional values are rejected.
pub fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(number) => whole_number(&number).map(Some).ok_or_else(|| {
            D::Error::custom(format!("expected a whole number, found {number}"))
        }),
        other => Err(D::Error::custom(format!(
            "expected a whole number, found {other}"
        ))),
    }
}

fn deserialize_stored_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => match whole_number(&number) {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!(
                "flag column must be stored as 0 or 1, found {number}"
            ))),
        },
        other => Err(D::Error::custom(format!(
            "flag column must be stored as 0 or 1, found {other}"
        ))),
    }
}

pub fn json_schema() -> serde_json::Result<Value> {
    serde_json::to_value(schemars::schema_for!(StopRecord))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{STOP_RECORD_COLUMNS, StopRecord, json_schema};

    fn stored_row() -> serde_json::Value {
        json!({
            "stop_date": "2020-01-01",
            "stop_time": "22:15:00",
            "country_name": "Canada",
            "driver_gender": "M",
            "driver_age_raw": 24,
            "driver_age": 24,
            "driver_race": "Asian",
            "violation_raw": "Speeding",
            "violation": "Speeding",
            "search_conducted": 1,
            "search_type": null,
            "stop_outcome": "Arrest",
            "is_arrested": 1,
            "stop_duration": "0-15 Min",
            "drugs_related_stop": 0,
            "vehicle_number": "X1"
        })
    }

    #[test]
    fn decodes_stored_zero_one_flags() {
        let record: StopRecord =
            serde_json::from_value(stored_row()).expect("stored row should decode");
        assert!(record.search_conducted);
        assert!(record.is_arrested);
        assert!(!record.drugs_related_stop);
        assert_eq!(record.search_type, None);
        assert_eq!(record.driver_age, Some(24));
    }

    #[test]
    fn null_cells_decode_as_none() {
        let mut row = stored_row();
        row["violation"] = json!(null);
        row["stop_date"] = json!(null);
        row["driver_age"] = json!(null);

        let record: StopRecord = serde_json::from_value(row).expect("nulls should decode");
        assert_eq!(record.violation, None);
        assert_eq!(record.stop_date, None);
        assert_eq!(record.driver_age, None);
        assert_eq!(record.violation_raw.as_deref(), Some("Speeding"));
    }

    #[test]
    fn whole_number_columns_accept_integral_reals() {
        let mut row = stored_row();
        row["driver_age"] = json!(30.0);
        row["driver_age_raw"] = json!(1990.0);
        row["is_arrested"] = json!(1.0);

        let record: StopRecord = serde_json::from_value(row).expect("integral reals decode");
        assert_eq!(record.driver_age, Some(30));
        assert_eq!(record.driver_age_raw, Some(1990));
        assert!(record.is_arrested);

        let mut row = stored_row();
        row["driver_age"] = json!(30.5);
        let error = serde_json::from_value::<StopRecord>(row).expect_err("30.5 is not an age");
        assert!(error.to_string().contains("whole number"), "{error}");
    }

    #[test]
    fn rejects_flags_outside_zero_one() {
        let mut row = stored_row();
        row["is_arrested"] = json!(2);
        let error = serde_json::from_value::<StopRecord>(row).expect_err("2 is not a flag");
        assert!(error.to_string().contains("stored as 0 or 1"), "{error}");

        let mut row = stored_row();
        row["search_conducted"] = json!("yes");
        assert!(serde_json::from_value::<StopRecord>(row).is_err());

        let mut row = stored_row();
        row["drugs_related_stop"] = json!(null);
        assert!(serde_json::from_value::<StopRecord>(row).is_err());
    }

    #[test]
    fn optional_columns_default_when_missing() {
        let mut row = stored_row();
        let object = row.as_object_mut().expect("row is an object");
        object.remove("driver_age_raw");
        object.remove("search_type");

        let record: StopRecord = serde_json::from_value(row).expect("row should decode");
        assert_eq!(record.driver_age_raw, None);
        assert_eq!(record.search_type, None);
    }

    #[test]
    fn row_view_uses_stored_flag_form_and_every_column() {
        let record: StopRecord =
            serde_json::from_value(stored_row()).expect("stored row should decode");
        let row = record.to_row();

        assert_eq!(row.len(), STOP_RECORD_COLUMNS.len());
        for column in STOP_RECORD_COLUMNS {
            assert!(row.contains_key(*column), "missing column {column}");
        }
        assert_eq!(row.get("search_conducted"), Some(&json!(1)));
        assert_eq!(row.get("drugs_related_stop"), Some(&json!(0)));
        assert_eq!(row.get("search_type"), Some(&json!(null)));
    }

    #[test]
    fn schema_lists_required_columns() {
        let schema = json_schema().expect("schema should serialize");
        let required = schema
            .get("required")
            .and_then(|value| value.as_array())
            .expect("schema should list required fields");
        assert!(required.contains(&json!("drugs_related_stop")));
        assert!(required.contains(&json!("is_arrested")));
        assert!(!required.contains(&json!("vehicle_number")));
        assert!(!required.contains(&json!("search_type")));
    }
}
