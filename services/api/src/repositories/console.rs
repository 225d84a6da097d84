//! Read-only SQL console

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::workflow::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleResult {
    pub result: Vec<Value>,
    pub columns: Vec<ColumnInfo>,
}

/// Display type of a JSON-rendered SQL value
pub fn column_type(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(s) if looks_like_date(s) => "date",
        _ => "string",
    }
}

fn looks_like_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Column names and types taken from the first row
pub fn describe_columns(rows: &[Value]) -> Vec<ColumnInfo> {
    match rows.first() {
        Some(Value::Object(first)) => first
            .iter()
            .map(|(name, value)| ColumnInfo {
                name: name.clone(),
                column_type: column_type(value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Console repository for ad-hoc queries
#[derive(Clone)]
pub struct ConsoleRepository {
    pool: PgPool,
}

impl ConsoleRepository {
    /// Create a new console repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run one query in a read-only transaction and return its rows as JSON
    pub async fn execute(&self, query: &str) -> Result<ConsoleResult, WorkflowError> {
        let statement = query.trim().trim_end_matches(';');
        if statement.is_empty() {
            return Err(WorkflowError::Invalid("Query is empty".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;

        let wrapped = format!(
            "SELECT COALESCE(json_agg(t), '[]'::json) FROM ({}) t",
            statement
        );
        let rows: Value = match sqlx::query_scalar(&wrapped).fetch_one(&mut *tx).await {
            Ok(rows) => rows,
            Err(sqlx::Error::Database(e)) => {
                warn!("Console query rejected: {}", e.message());
                return Err(WorkflowError::Invalid(e.message().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        tx.rollback().await?;

        let result = match rows {
            Value::Array(rows) => rows,
            _ => Vec::new(),
        };
        info!(rows = result.len(), "Executed console query");

        Ok(ConsoleResult {
            columns: describe_columns(&result),
            result,
        })
    }
}
