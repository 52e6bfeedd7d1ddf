use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::sqlite::DataUnavailableError;

pub const QUERY_ENVELOPE_SCHEMA_VERSION: &str = "securecheck.query-envelope.v1";

pub const DATA_UNAVAILABLE_WARNING: &str = "data_unavailable";
pub const NO_RESULTS_WARNING: &str = "no_results";

pub type QueryEnvelopeMeta = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelopeWarning {
    pub code: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelopeError {
    pub code: String,
    pub message: String,
}

/// Machine-readable wrapper around every `--json` command output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub ok: bool,
    pub command: String,
    pub generated_at_utc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    pub meta: QueryEnvelopeMeta,
    pub warnings: Vec<QueryEnvelopeWarning>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryEnvelopeError>,
}

impl QueryEnvelope {
    #[must_use]
    pub fn ok(command: impl Into<String>, data: Value) -> Self {
        Self::base(command, true).with_data(data)
    }

    #[must_use]
    pub fn error(
        command: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut envelope = Self::base(command, false);
        envelope.error = Some(QueryEnvelopeError {
            code: code.into(),
            message: message.into(),
        });
        envelope
    }

    fn base(command: impl Into<String>, ok: bool) -> Self {
        let mut meta = QueryEnvelopeMeta::new();
        meta.insert(
            "schema_version".to_string(),
            json!(QUERY_ENVELOPE_SCHEMA_VERSION),
        );

        Self {
            ok,
            command: command.into(),
            generated_at_utc: generated_at_utc_now(),
            data: None,
            meta,
            warnings: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_warning(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.warnings.push(QueryEnvelopeWarning {
            code: code.into(),
            message: message.into(),
            details: None,
        });
        self
    }

    #[must_use]
    pub fn with_warning_details(mut self, details: Value) -> Self {
        if let Some(last_warning) = self.warnings.last_mut() {
            last_warning.details = Some(details);
        }
        self
    }

    /// Data failures stay non-fatal: the envelope remains `ok` and carries a warning.
    #[must_use]
    pub fn with_data_unavailable(self, error: &DataUnavailableError) -> Self {
        let mut details = json!({
            "reason": error.reason(),
            "cause": error.to_string(),
        });
        if let Some(guardrail) = error.details() {
            details["guardrail"] = guardrail.clone();
        }
        self.with_warning(DATA_UNAVAILABLE_WARNING, "data unavailable")
            .with_warning_details(details)
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn generated_at_utc_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
