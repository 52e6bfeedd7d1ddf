use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlGuardrailViolation {
    pub message: String,
    pub details: Value,
}

/// Accepts exactly one read-only statement: `SELECT`, `WITH ... SELECT`, or
/// `EXPLAIN [QUERY PLAN] SELECT`.
pub fn validate_read_only_sql(raw_sql: &str) -> Result<(), SqlGuardrailViolation> {
    let candidate = strip_trailing_semicolons(raw_sql);
    if candidate.is_empty() {
        return Err(guardrail_violation(
            "SQL query is empty",
            json!({"reason":"empty_statement"}),
        ));
    }

    if candidate.contains(';') {
        return Err(guardrail_violation(
            "Multi-statement SQL is not allowed",
            json!({"reason":"multi_statement"}),
        ));
    }

    let normalized = candidate
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(keyword) = first_mutating_keyword(&normalized) {
        return Err(guardrail_violation(
            format!("Mutating SQL keyword `{keyword}` is not allowed"),
            json!({"reason":"mutating_statement","detected_keyword":keyword}),
        ));
    }

    let allowed = normalized.starts_with("select")
        || normalized.starts_with("with")
        || normalized.starts_with("explain select")
        || normalized.starts_with("explain query plan select");
    if !allowed {
        return Err(guardrail_violation(
            "Only SELECT, WITH ... SELECT, and EXPLAIN ... SELECT statements are allowed",
            json!({
                "reason":"unsupported_statement",
                "leading_keyword":leading_keyword(&normalized)
            }),
        ));
    }

    Ok(())
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

fn first_mutating_keyword(normalized_sql: &str) -> Option<String> {
    const MUTATING_KEYWORDS: &[&str] = &[
        "insert", "update", "delete", "create", "alter", "drop", "replace", "truncate", "attach",
        "detach", "pragma", "vacuum", "reindex", "analyze", "begin", "commit", "rollback",
    ];

    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .find_map(|token| {
            MUTATING_KEYWORDS
                .contains(&token)
                .then_some(token.to_string())
        })
}

fn leading_keyword(normalized_sql: &str) -> String {
    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .find(|token| !token.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn guardrail_violation(message: impl Into<String>, details: Value) -> SqlGuardrailViolation {
    SqlGuardrailViolation {
        message: message.into(),
        details: json!({
            "guardrail":"read_only_sql_single_statement",
            "violation": details
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_read_only_sql;

    fn violation_reason(sql: &str) -> Option<String> {
        validate_read_only_sql(sql).err().and_then(|violation| {
            violation
                .details
                .pointer("/violation/reason")
                .and_then(|value| value.as_str())
                .map(ToString::to_string)
        })
    }

    #[test]
    fn allows_select_with_optional_trailing_semicolon() {
        assert!(validate_read_only_sql("SELECT * FROM policelog").is_ok());
        assert!(validate_read_only_sql("select 1 ; ").is_ok());
    }

    #[test]
    fn allows_with_and_explain_select_forms() {
        assert!(validate_read_only_sql("WITH t AS (SELECT 1) SELECT * FROM t").is_ok());
        assert!(validate_read_only_sql("EXPLAIN QUERY PLAN SELECT * FROM policelog").is_ok());
        assert!(validate_read_only_sql("explain\n  select 1").is_ok());
    }

    #[test]
    fn rejects_empty_multi_statement_and_mutating_sql() {
        assert_eq!(violation_reason("   "), Some("empty_statement".to_string()));
        assert_eq!(
            violation_reason("SELECT 1; SELECT 2"),
            Some("multi_statement".to_string())
        );
        assert_eq!(
            violation_reason("DELETE FROM policelog"),
            Some("mutating_statement".to_string())
        );

        let violation = validate_read_only_sql("INSERT INTO policelog VALUES (1)")
            .expect_err("insert must be rejected");
        assert_eq!(
            violation
                .details
                .pointer("/violation/detected_keyword")
                .and_then(|value| value.as_str()),
            Some("insert")
        );
    }

    #[test]
    fn underscored_identifiers_are_not_keywords() {
        assert!(validate_read_only_sql("SELECT drop_count, update_at FROM policelog").is_ok());
    }

    #[test]
    fn rejects_statements_that_do_not_start_with_select() {
        let violation =
            validate_read_only_sql("VALUES (1)").expect_err("VALUES is not a query form");
        assert_eq!(
            violation
                .details
                .pointer("/violation/leading_keyword")
                .and_then(|value| value.as_str()),
            Some("values")
        );
    }
}
