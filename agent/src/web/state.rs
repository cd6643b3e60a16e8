//! Shared application state

use std::sync::Arc;

use crate::agent::TextToSqlAgent;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "sql-agent";

/// Shared application state, built once at startup and cloned into handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<TextToSqlAgent>,
}

impl AppState {
    /// Create new app state
    pub fn new(agent: TextToSqlAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}
