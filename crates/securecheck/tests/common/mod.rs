#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use securecheck::config::{DatabaseConfig, TableName};
use securecheck::models::{StopRecord, stored_flag};

const CREATE_POLICELOG: &str = "
CREATE TABLE policelog (
    stop_date TEXT,
    stop_time TEXT,
    country_name TEXT,
    driver_gender TEXT,
    driver_age_raw INTEGER,
    driver_age INTEGER,
    driver_race TEXT,
    violation_raw TEXT,
    violation TEXT,
    search_conducted INTEGER,
    search_type TEXT,
    stop_outcome TEXT,
    is_arrested INTEGER,
    stop_duration TEXT,
    drugs_related_stop INTEGER,
    vehicle_number TEXT
)";

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

/// A plain stop with no search, no arrest and no drugs involved.
pub fn stop(stop_date: &str, vehicle_number: &str) -> StopRecord {
    StopRecord {
        stop_date: text(stop_date),
        stop_time: text("10:15:00"),
        country_name: text("Canada"),
        driver_gender: text("M"),
        driver_age_raw: Some(1990),
        driver_age: Some(30),
        driver_race: text("White"),
        violation_raw: text("Speeding"),
        violation: text("Speeding"),
        search_conducted: false,
        search_type: None,
        stop_outcome: text("Citation"),
        is_arrested: false,
        stop_duration: text("0-15 Min"),
        drugs_related_stop: false,
        vehicle_number: text(vehicle_number),
    }
}

pub fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub fn arrested(mut record: StopRecord) -> StopRecord {
    record.stop_outcome = text("Arrest");
    record.is_arrested = true;
    record
}

pub fn searched(mut record: StopRecord) -> StopRecord {
    record.search_conducted = true;
    record.search_type = text("Vehicle Search");
    record
}

pub fn write_policelog(path: &Path, records: &[StopRecord]) {
    write_policelog_with_schema(path, CREATE_POLICELOG, records);
}

/// Same table, with the age columns declared `REAL` the way dataframe
/// exports store ages once a column holds a missing value.
pub fn write_policelog_with_real_ages(path: &Path, records: &[StopRecord]) {
    let create = CREATE_POLICELOG
        .replace("driver_age_raw INTEGER", "driver_age_raw REAL")
        .replace("driver_age INTEGER", "driver_age REAL");
    write_policelog_with_schema(path, &create, records);
}

/// Runs a statement against an existing fixture database.
pub fn alter_fixture(path: &Path, sql: &str) {
    let connection = Connection::open(path).expect("fixture database should open");
    connection
        .execute_batch(sql)
        .expect("fixture statement should run");
}

fn write_policelog_with_schema(path: &Path, create: &str, records: &[StopRecord]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("database dir should be creatable");
    }
    let connection = Connection::open(path).expect("fixture database should open");
    connection
        .execute_batch(create)
        .expect("policelog table should be creatable");

    let mut insert = connection
        .prepare(
            "INSERT INTO policelog VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )
        .expect("insert should prepare");
    for record in records {
        insert
            .execute(params![
                record.stop_date,
                record.stop_time,
                record.country_name,
                record.driver_gender,
                record.driver_age_raw,
                record.driver_age,
                record.driver_race,
                record.violation_raw,
                record.violation,
                stored_flag(record.search_conducted),
                record.search_type,
                record.stop_outcome,
                stored_flag(record.is_arrested),
                record.stop_duration,
                stored_flag(record.drugs_related_stop),
                record.vehicle_number,
            ])
            .expect("fixture row should insert");
    }
}

/// Writes `records` to a fresh database and returns a config pointing at it.
pub fn fixture_database(label: &str, records: &[StopRecord]) -> DatabaseConfig {
    let path = unique_temp_dir(&format!("securecheck-{label}")).join("secure_check.sqlite");
    write_policelog(&path, records);
    DatabaseConfig::new(path, TableName::default())
}
