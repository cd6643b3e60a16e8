//! Natural-language questions to read-only PostgreSQL queries
//!
//! [`agent::TextToSqlAgent`] reads the schema, asks an LLM for a query,
//! passes it through [`guard`], and executes it.

pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod schema;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AgentError, Result};
