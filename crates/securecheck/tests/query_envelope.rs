use std::path::PathBuf;

use securecheck::config::{DatabaseConfig, TableName};
use securecheck::models::{
    DATA_UNAVAILABLE_WARNING, NO_RESULTS_WARNING, QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope,
};
use securecheck::sqlite::SqliteExecutor;
use serde_json::json;

#[test]
fn ok_envelope_tracks_contract_fields() {
    let envelope = QueryEnvelope::ok(
        "reports.run",
        json!({
            "columns": ["vehicle_number", "stop_count"],
            "rows": [{"vehicle_number": "X1", "stop_count": 1}]
        }),
    )
    .with_meta("row_count", json!(1))
    .with_warning(NO_RESULTS_WARNING, "No results found.")
    .with_warning_details(json!({"tier": "advanced"}));

    assert!(envelope.ok);
    assert_eq!(envelope.command, "reports.run");
    assert!(envelope.generated_at_utc.ends_with('Z'));
    assert!(envelope.data.is_some());
    assert_eq!(
        envelope.meta.get("schema_version"),
        Some(&json!(QUERY_ENVELOPE_SCHEMA_VERSION))
    );
    assert_eq!(envelope.meta.get("row_count"), Some(&json!(1)));
    assert_eq!(envelope.warnings.len(), 1);
    assert_eq!(envelope.warnings[0].code, NO_RESULTS_WARNING);
    assert_eq!(
        envelope.warnings[0].details.as_ref(),
        Some(&json!({"tier": "advanced"}))
    );
    assert!(envelope.error.is_none());
}

#[test]
fn ok_envelope_serializes_required_top_level_fields() {
    let envelope = QueryEnvelope::ok("reports.list", json!({"tiers": []}));
    let encoded = serde_json::to_value(&envelope).expect("envelope should serialize");

    let object = encoded
        .as_object()
        .expect("query envelope JSON should be object");
    assert_eq!(object.get("ok"), Some(&json!(true)));
    assert_eq!(object.get("command"), Some(&json!("reports.list")));
    assert!(object.contains_key("generated_at_utc"));
    assert!(object.contains_key("data"));
    assert!(object.contains_key("meta"));
    assert!(object.contains_key("warnings"));
    assert!(!object.contains_key("error"));
}

#[test]
fn error_envelope_sets_status_and_error_payload() {
    let envelope = QueryEnvelope::error("reports", "unknown_query", "unknown advanced query `x`");
    assert!(!envelope.ok);
    assert_eq!(envelope.command, "reports");
    assert!(envelope.data.is_none());
    assert!(envelope.warnings.is_empty());

    let error = envelope.error.as_ref().expect("error payload should exist");
    assert_eq!(error.code, "unknown_query");
    assert_eq!(error.message, "unknown advanced query `x`");
}

#[test]
fn data_unavailable_warning_keeps_envelope_ok() {
    let missing = std::env::temp_dir()
        .join(PathBuf::from("securecheck-envelope-missing"))
        .join("secure_check.sqlite");
    let executor = SqliteExecutor::new(DatabaseConfig::new(missing, TableName::default()));
    let error = executor
        .load_table()
        .expect_err("missing database should be unavailable");

    let envelope = QueryEnvelope::ok("dashboard", json!({"rows": []})).with_data_unavailable(&error);

    assert!(envelope.ok);
    assert_eq!(envelope.warnings.len(), 1);
    assert_eq!(envelope.warnings[0].code, DATA_UNAVAILABLE_WARNING);
    let details = envelope.warnings[0]
        .details
        .as_ref()
        .expect("warning should carry details");
    assert_eq!(details["reason"], "connection_failed");
    assert!(
        details["cause"]
            .as_str()
            .is_some_and(|cause| cause.contains("secure_check.sqlite"))
    );
}

#[test]
fn guardrail_rejection_warning_carries_violation_details() {
    let executor = SqliteExecutor::new(DatabaseConfig::new(
        std::env::temp_dir().join("securecheck-envelope-guardrail.sqlite"),
        TableName::default(),
    ));
    let error = executor
        .execute("DROP TABLE policelog")
        .expect_err("mutating SQL should be rejected");

    let envelope = QueryEnvelope::ok("reports.run", json!({"rows": []})).with_data_unavailable(&error);

    let details = envelope.warnings[0]
        .details
        .as_ref()
        .expect("warning should carry details");
    assert_eq!(details["reason"], "sql_guardrail_violation");
    assert_eq!(
        details.pointer("/guardrail/violation/reason"),
        Some(&json!("mutating_statement"))
    );
    assert_eq!(
        details.pointer("/guardrail/violation/detected_keyword"),
        Some(&json!("drop"))
    );
}

#[test]
fn connection_failures_carry_no_guardrail_details() {
    let missing = std::env::temp_dir()
        .join("securecheck-envelope-no-guardrail")
        .join("secure_check.sqlite");
    let executor = SqliteExecutor::new(DatabaseConfig::new(missing, TableName::default()));
    let error = executor
        .execute("SELECT 1")
        .expect_err("missing database should be unavailable");

    assert!(error.details().is_none());
    let envelope = QueryEnvelope::ok("reports.run", json!({"rows": []})).with_data_unavailable(&error);
    let details = envelope.warnings[0]
        .details
        .as_ref()
        .expect("warning should carry details");
    assert!(details.get("guardrail").is_none());
}

#[test]
fn json_line_is_single_line() {
    let line = QueryEnvelope::ok("schema", json!({"type": "object"}))
        .to_json_line()
        .expect("envelope should encode");
    assert!(!line.contains('\n'));
}
