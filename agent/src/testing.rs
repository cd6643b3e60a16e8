//! In-memory fakes for the store and the model

use anyhow::{anyhow, Result as AnyResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::db::{is_select_statement, QueryOutcome, Row, SqlExecutor};
use crate::error::{AgentError, Result};
use crate::llm::Llm;
use crate::schema::SCHEMA_QUERY;

pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Metadata row as returned by the information_schema query
pub fn schema_row(table: &str, column: &str, data_type: &str, nullable: bool) -> Row {
    row(json!({
        "table_name": table,
        "column_name": column,
        "data_type": data_type,
        "is_nullable": if nullable { "YES" } else { "NO" },
    }))
}

#[derive(Default)]
pub struct FakeExecutor {
    schema_rows: Vec<Row>,
    query_rows: Vec<Row>,
    fail_metadata: bool,
    fail_ping: bool,
    fail_reconnect: bool,
    executed: Mutex<Vec<String>>,
    reconnects: AtomicUsize,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, rows: Vec<Row>) -> Self {
        self.schema_rows = rows;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.query_rows = rows;
        self
    }

    pub fn with_failing_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    pub fn with_failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    pub fn with_failing_reconnect(mut self) -> Self {
        self.fail_reconnect = true;
        self
    }

    /// Every statement passed to `run_query`, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Statements other than the metadata query
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|sql| sql != SCHEMA_QUERY)
            .collect()
    }

    pub fn reconnect_attempts(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SqlExecutor for FakeExecutor {
    async fn run_query(&self, sql: &str) -> Result<QueryOutcome> {
        self.executed.lock().unwrap().push(sql.to_string());

        if sql == SCHEMA_QUERY {
            if self.fail_metadata {
                return Err(AgentError::DataAccess("connection refused".to_string()));
            }
            return Ok(QueryOutcome::Rows(self.schema_rows.clone()));
        }
        if sql == "SELECT 1" && self.fail_ping {
            return Err(AgentError::DataAccess(
                "server closed the connection".to_string(),
            ));
        }
        if is_select_statement(sql) {
            Ok(QueryOutcome::Rows(self.query_rows.clone()))
        } else {
            Ok(QueryOutcome::Affected(0))
        }
    }

    async fn reconnect(&self) -> Result<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_reconnect {
            Err(AgentError::DataAccess("Failed to connect to PostgreSQL".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Model that returns a canned response and records what it was sent
pub struct FakeLlm {
    response: std::result::Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn replying(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (system, user) pairs received so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Llm for FakeLlm {
    async fn generate(&self, prompt: &str) -> AnyResult<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, user: &str) -> AnyResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.response.clone().map_err(|e| anyhow!(e))
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}
