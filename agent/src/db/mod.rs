//! Database module for query execution
//!
//! Holds one long-lived PostgreSQL connection. Callers go through the
//! [`SqlExecutor`] trait so the schema reader and the agent can run against
//! an in-memory fake in tests.

pub mod value;

pub use value::Row;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{Connection, Executor};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::error::{AgentError, Result};

/// What a statement produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows from a SELECT-shaped statement
    Rows(Vec<Row>),
    /// Affected row count from any other statement
    Affected(u64),
}

impl QueryOutcome {
    /// The rows, or an error if the statement did not return any
    pub fn into_rows(self) -> Result<Vec<Row>> {
        match self {
            QueryOutcome::Rows(rows) => Ok(rows),
            QueryOutcome::Affected(n) => Err(AgentError::DataAccess(format!(
                "Expected rows but statement affected {} rows",
                n
            ))),
        }
    }
}

/// True if the statement is routed to the row-returning path
pub fn is_select_statement(sql: &str) -> bool {
    sql.trim().to_uppercase().starts_with("SELECT")
}

/// The single query-execution primitive used for metadata and generated SQL
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a statement. SELECT-shaped statements return rows; anything else
    /// runs in a transaction and returns the affected row count.
    async fn run_query(&self, sql: &str) -> Result<QueryOutcome>;

    /// Drop the current connection and open a new one
    async fn reconnect(&self) -> Result<()>;

    /// Liveness probe
    async fn ping(&self) -> Result<()> {
        self.run_query("SELECT 1").await.map(|_| ())
    }

    /// Probe the connection and reconnect at most once if the probe fails.
    ///
    /// A failed reconnect is returned as-is; there is no retry loop.
    async fn ensure_connection(&self) -> Result<()> {
        match self.ping().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Database connection lost: {}. Reconnecting...", e);
                self.reconnect().await.map_err(|reconnect_error| {
                    tracing::error!("Reconnection failed: {}", reconnect_error);
                    reconnect_error
                })
            }
        }
    }
}

/// PostgreSQL connection wrapper with serialized access
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Option<PgConnection>>>,
    options: PgConnectOptions,
}

impl Database {
    /// Connect using the given settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = connect_options(config);

        tracing::info!(
            "Connecting to postgres at {}:{}/{} as {}",
            config.host,
            config.port,
            config.name,
            config.user
        );
        let conn = PgConnection::connect_with(&options).await.map_err(|e| {
            tracing::error!("Database connection failed: {}", e);
            AgentError::DataAccess(format!("Failed to connect to PostgreSQL: {}", e))
        })?;
        tracing::info!("Database connection established");

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            options,
        })
    }

    /// Close the connection. Later queries fail until [`SqlExecutor::reconnect`].
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await?;
            tracing::info!("Database connection closed");
        }
        Ok(())
    }
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password)
        .ssl_mode(config.ssl_mode)
}

fn not_connected() -> AgentError {
    AgentError::DataAccess("Database connection is not open".to_string())
}

#[async_trait]
impl SqlExecutor for Database {
    async fn run_query(&self, sql: &str) -> Result<QueryOutcome> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_connected)?;

        if is_select_statement(sql) {
            let rows = Executor::fetch_all(&mut *conn, sqlx::raw_sql(sql))
                .await
                .map_err(|e| {
                    tracing::error!("Query execution failed: {}", e);
                    AgentError::from(e)
                })?;
            let rows = rows
                .iter()
                .map(value::row_to_json)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(QueryOutcome::Rows(rows));
        }

        let mut tx = conn.begin().await?;
        match Executor::execute(&mut *tx, sqlx::raw_sql(sql)).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(QueryOutcome::Affected(result.rows_affected()))
            }
            Err(e) => {
                tracing::error!("Statement failed, rolling back: {}", e);
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!("Rollback failed: {}", rollback_error);
                }
                Err(e.into())
            }
        }
    }

    async fn reconnect(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        // The old handle is presumed dead; drop it without a close handshake.
        *guard = None;

        let conn = PgConnection::connect_with(&self.options).await.map_err(|e| {
            AgentError::DataAccess(format!("Failed to connect to PostgreSQL: {}", e))
        })?;
        *guard = Some(conn);
        tracing::info!("Database connection re-established");
        Ok(())
    }
}
