//! Error kinds for the question-to-SQL pipeline
//!
//! Every fallible operation in the library returns [`AgentError`]. The HTTP
//! layer maps [`AgentError::UnsafeQuery`] to a client error and everything
//! else to a server error.

use thiserror::Error;

use crate::guard::Rejection;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors raised while answering a question
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required setting is missing or malformed (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A metadata or query-store call failed
    #[error("Query execution failed: {0}")]
    DataAccess(String),

    /// The model call failed or returned unusable output
    #[error("SQL generation failed: {0}")]
    Generation(String),

    /// The generated query was rejected by the safety gate
    #[error("Only SELECT queries are allowed: {0}")]
    UnsafeQuery(#[from] Rejection),
}

impl AgentError {
    /// True when the caller (not the server) is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::UnsafeQuery(_))
    }
}

impl From<sqlx::Error> for AgentError {
    fn from(e: sqlx::Error) -> Self {
        AgentError::DataAccess(e.to_string())
    }
}
