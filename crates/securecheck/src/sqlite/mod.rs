//! Read-only access to the traffic-stop database.
//!
//! Every call opens its own connection, runs one guarded statement, and drops
//! the connection before returning. All failure causes collapse into
//! [`DataUnavailableError`].

pub mod guardrail;

use std::path::{Path, PathBuf};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::config::{DatabaseConfig, TableName};
use crate::models::StopRecord;

pub use guardrail::{SqlGuardrailViolation, validate_read_only_sql};

pub type ResultRow = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum DataUnavailableError {
    #[error("unable to open database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query rejected: {}", violation.message)]
    Guardrail { violation: SqlGuardrailViolation },

    #[error("query execution failed: {source}")]
    Execution {
        #[source]
        source: rusqlite::Error,
    },

    #[error("unable to decode result rows: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl DataUnavailableError {
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection_failed",
            Self::Guardrail { .. } => "sql_guardrail_violation",
            Self::Execution { .. } => "query_execution_failed",
            Self::Decode { .. } => "row_decode_failed",
        }
    }

    /// Structured detail for guardrail rejections.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Guardrail { violation } => Some(&violation.details),
            _ => None,
        }
    }
}

/// Rows returned by one statement, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|values| values.get(column))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, DataUnavailableError> {
        self.rows
            .iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row.clone()))
                    .map_err(|source| DataUnavailableError::Decode { source })
            })
            .collect()
    }
}

#[must_use]
pub fn base_query_sql(table: &TableName) -> String {
    format!("SELECT * FROM {table}")
}

#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    config: DatabaseConfig,
}

impl SqliteExecutor {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn execute(&self, sql: &str) -> Result<ResultSet, DataUnavailableError> {
        validate_read_only_sql(sql)
            .map_err(|violation| DataUnavailableError::Guardrail { violation })?;

        tracing::debug!(
            database = %self.config.database_path.display(),
            sql = sql.trim(),
            "executing read-only query"
        );
        let connection = open_read_only_connection(&self.config.database_path)?;
        let result = collect_rows(&connection, sql)?;
        tracing::debug!(rows = result.len(), "query completed");

        Ok(result)
    }

    /// Runs the fixed base query and decodes the whole table.
    pub fn load_table(&self) -> Result<Vec<StopRecord>, DataUnavailableError> {
        self.execute(&base_query_sql(&self.config.table))?.decode()
    }
}

pub fn open_read_only_connection(path: &Path) -> Result<Connection, DataUnavailableError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| DataUnavailableError::Connection {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_rows(connection: &Connection, sql: &str) -> Result<ResultSet, DataUnavailableError> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|source| DataUnavailableError::Execution { source })?;
    let columns = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut rows = statement
        .query([])
        .map_err(|source| DataUnavailableError::Execution { source })?;
    let mut result_rows = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|source| DataUnavailableError::Execution { source })?
    {
        let mut record = ResultRow::new();
        for (index, column_name) in columns.iter().enumerate() {
            let value = row
                .get::<usize, SqlValue>(index)
                .map_err(|source| DataUnavailableError::Execution { source })?;
            record.insert(column_name.clone(), json_value_from_sql(value));
        }
        result_rows.push(record);
    }

    Ok(ResultSet {
        columns,
        rows: result_rows,
    })
}

fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => json!(value),
        SqlValue::Blob(value) => json!(encode_blob_hex(&value)),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}
