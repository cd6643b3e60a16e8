//! Configuration loading
//!
//! Settings come from the process environment, with an optional `.env` file
//! filling in anything the environment does not set. Required values are
//! validated up front so a misconfigured service fails before it opens a
//! connection.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use sqlx::postgres::PgSslMode;

use crate::error::{AgentError, Result};

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    /// May be empty for local trust authentication
    pub password: String,
    /// TLS negotiation, `DB_SSLMODE` (libpq names: disable, prefer, require, ...)
    pub ssl_mode: PgSslMode,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Which model backend generates SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(AgentError::Configuration(format!(
                "Unknown LLM_PROVIDER '{}' (expected 'anthropic' or 'ollama')",
                other
            ))),
        }
    }
}

/// Model settings
#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// 0.0 = deterministic
    pub temperature: f32,
    /// Required when `provider` is Anthropic; checked by [`crate::llm::from_config`]
    pub api_key: Option<String>,
    pub ollama_url: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("ollama_url", &self.ollama_url)
            .finish()
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

// Default value functions
fn default_anthropic_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_ollama_model() -> String {
    "qwen3-coder:30b".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_SERVER_PORT: u16 = 8000;

impl Config {
    /// Load from the environment, falling back to a `.env` file found by
    /// walking up from the current directory
    pub fn load() -> Result<Self> {
        let file_vars = match dotenvy::dotenv_iter() {
            Ok(iter) => collect_env_file(iter)?,
            Err(e) if e.not_found() => {
                tracing::debug!("No .env file found");
                HashMap::new()
            }
            Err(e) => {
                return Err(AgentError::Configuration(format!(
                    "Failed to read .env file: {}",
                    e
                )))
            }
        };

        Self::from_env_and(file_vars)
    }

    /// Load from the environment, falling back to a specific env file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AgentError::Configuration(format!("Failed to read {:?}: {}", path, e))
        })?;
        let file_vars = collect_env_file(iter)?;

        Self::from_env_and(file_vars)
    }

    fn from_env_and(file_vars: HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                AgentError::Configuration(format!(
                    "Required environment variable '{}' is not set",
                    key
                ))
            })
        };

        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            name: required("DB_NAME")?,
            user: required("DB_USER")?,
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            port: parse_or("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?,
            ssl_mode: parse_or("DB_SSLMODE", get("DB_SSLMODE"), PgSslMode::Prefer)?,
        };

        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::Anthropic,
        };
        let model = get("LLM_MODEL").unwrap_or_else(|| match provider {
            LlmProvider::Anthropic => default_anthropic_model(),
            LlmProvider::Ollama => default_ollama_model(),
        });

        let llm = LlmConfig {
            provider,
            model,
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.0)?,
            api_key: get("ANTHROPIC_API_KEY"),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(default_ollama_url),
        };

        let server = ServerConfig {
            port: parse_or("PORT", get("PORT"), DEFAULT_SERVER_PORT)?,
        };

        Ok(Self {
            database,
            llm,
            server,
        })
    }
}

fn collect_env_file<R: std::io::Read>(
    iter: dotenvy::Iter<R>,
) -> Result<HashMap<String, String>> {
    iter.collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(|e| AgentError::Configuration(format!("Invalid .env file: {}", e)))
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AgentError::Configuration(format!("Invalid value '{}' for '{}'", raw, key))
        }),
        None => Ok(default),
    }
}
