//! Result types returned by the agent

use serde::Serialize;

use crate::db::Row;

/// Rows returned by an executed query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            row_count: rows.len(),
            rows,
        }
    }
}

/// A question answered end to end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// The cleaned query that was executed
    pub sql_query: String,
    pub result: QueryResult,
}
