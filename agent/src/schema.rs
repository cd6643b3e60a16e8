//! Schema context for SQL generation
//!
//! Reads table and column definitions from `information_schema` and renders
//! them as the text block embedded in the model prompt. The snapshot is
//! rebuilt on every request and the whole catalog is held in memory, which
//! suits interactive use on schemas of modest size.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::{QueryOutcome, Row, SqlExecutor};
use crate::error::{AgentError, Result};

/// Metadata query for the `public` schema, one row per column
pub const SCHEMA_QUERY: &str = "SELECT table_name::text AS table_name, \
column_name::text AS column_name, \
data_type::text AS data_type, \
is_nullable::text AS is_nullable \
FROM information_schema.columns \
WHERE table_schema = 'public' \
ORDER BY table_name, ordinal_position;";

/// Default number of rows returned by [`SchemaReader::sample_rows`]
pub const DEFAULT_SAMPLE_LIMIT: u32 = 3;

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Columns grouped by table; tables sorted by name, columns in ordinal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    tables: BTreeMap<String, Vec<ColumnDescriptor>>,
}

impl SchemaSnapshot {
    /// Group columns by table, keeping the order they arrive in within each table
    pub fn from_columns(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        let mut tables: BTreeMap<String, Vec<ColumnDescriptor>> = BTreeMap::new();
        for column in columns {
            tables.entry(column.table.clone()).or_default().push(column);
        }
        Self { tables }
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &[ColumnDescriptor])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Render a snapshot for the model prompt.
///
/// The layout is embedded verbatim in prompts, so keep it stable:
///
/// ```text
/// Database Schema:
///
/// Table: users
///   - id (integer) NOT NULL
///   - name (character varying) NULL
/// ```
pub fn format_for_prompt(snapshot: &SchemaSnapshot) -> String {
    let mut formatted = String::from("Database Schema:\n\n");
    for (table, columns) in snapshot.tables() {
        formatted.push_str(&format!("Table: {}\n", table));
        let lines: Vec<String> = columns
            .iter()
            .map(|c| {
                let nullable = if c.nullable { "NULL" } else { "NOT NULL" };
                format!("  - {} ({}) {}", c.column, c.data_type, nullable)
            })
            .collect();
        formatted.push_str(&lines.join("\n"));
        formatted.push_str("\n\n");
    }
    formatted.trim().to_string()
}

/// Quote a PostgreSQL identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reads schema metadata through a [`SqlExecutor`]
#[derive(Clone)]
pub struct SchemaReader {
    executor: Arc<dyn SqlExecutor>,
}

impl SchemaReader {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Fetch the current schema of the `public` namespace
    pub async fn read_schema(&self) -> Result<SchemaSnapshot> {
        let rows = self
            .executor
            .run_query(SCHEMA_QUERY)
            .await
            .and_then(QueryOutcome::into_rows)
            .map_err(|e| {
                tracing::error!("Failed to retrieve schema: {}", e);
                e
            })?;

        let columns = rows
            .iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>>>()?;
        let snapshot = SchemaSnapshot::from_columns(columns);

        tracing::info!("Retrieved schema for {} tables", snapshot.table_count());
        Ok(snapshot)
    }

    /// Fetch and render the schema in one step
    pub async fn format_schema(&self) -> Result<String> {
        let snapshot = self.read_schema().await?;
        Ok(format_for_prompt(&snapshot))
    }

    /// First `limit` rows of a table
    pub async fn sample_rows(&self, table: &str, limit: u32) -> Result<Vec<Row>> {
        let sql = format!("SELECT * FROM {} LIMIT {};", quote_identifier(table), limit);
        let outcome = self.executor.run_query(&sql).await;
        match outcome.and_then(QueryOutcome::into_rows) {
            Ok(rows) => {
                tracing::info!("Retrieved {} sample rows from {}", rows.len(), table);
                Ok(rows)
            }
            Err(e) => {
                tracing::error!("Failed to retrieve sample data from {}: {}", table, e);
                Err(e)
            }
        }
    }
}

fn column_from_row(row: &Row) -> Result<ColumnDescriptor> {
    let field = |name: &str| match row.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(AgentError::DataAccess(format!(
            "Schema row is missing text field '{}'",
            name
        ))),
    };

    Ok(ColumnDescriptor {
        table: field("table_name")?,
        column: field("column_name")?,
        data_type: field("data_type")?,
        nullable: field("is_nullable")? == "YES",
    })
}
