//! Shared helpers for E2E tests

use anyhow::Result;
use async_trait::async_trait;

use sql_agent::config::Config;
use sql_agent::db::{Database, SqlExecutor};
use sql_agent::llm::Llm;

/// Load config from the environment; the LLM settings are not used
pub fn test_config() -> Config {
    let _ = dotenvy::dotenv();
    Config::from_lookup(|key| match key {
        "LLM_PROVIDER" => Some("ollama".to_string()),
        _ => std::env::var(key).ok(),
    })
    .expect("DB_HOST, DB_NAME and DB_USER must be set for E2E tests")
}

/// Open a connection to the test database
pub async fn connect() -> Database {
    Database::connect(&test_config().database)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// Table name unique to this test process
pub fn table_name(suffix: &str) -> String {
    format!("e2e_{}_{}", suffix, std::process::id())
}

/// Create `<name>(id integer NOT NULL, name varchar NULL)` with two rows
pub async fn create_users_table(db: &Database, name: &str) {
    db.run_query(&format!("DROP TABLE IF EXISTS {}", name))
        .await
        .expect("Failed to drop old table");
    db.run_query(&format!(
        "CREATE TABLE {} (id integer NOT NULL, name varchar NULL)",
        name
    ))
    .await
    .expect("Failed to create table");
    db.run_query(&format!(
        "INSERT INTO {} (id, name) VALUES (1, 'Ada'), (2, NULL)",
        name
    ))
    .await
    .expect("Failed to insert rows");
}

pub async fn drop_table(db: &Database, name: &str) {
    db.run_query(&format!("DROP TABLE IF EXISTS {}", name))
        .await
        .expect("Failed to drop table");
}

/// LLM stand-in that always returns the same text
pub struct StaticLlm(pub String);

#[async_trait]
impl Llm for StaticLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn generate_with_system(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.0.clone())
    }

    fn model(&self) -> &str {
        "static"
    }
}
