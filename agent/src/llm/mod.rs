//! LLM abstraction layer
//!
//! The agent only needs text in, text out. Backends return the model's reply
//! trimmed of surrounding whitespace; everything else is left to the caller.

mod anthropic;
mod ollama;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::AgentError;

/// Trait for LLM backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Generate from a single combined prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate from separate system and user instructions
    async fn generate_with_system(&self, system: &str, user: &str) -> Result<String>;

    /// Get the model name
    fn model(&self) -> &str;
}

/// Build the configured backend
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Llm>, AgentError> {
    match config.provider {
        LlmProvider::Anthropic => {
            let api_key = config.api_key.as_deref().ok_or_else(|| {
                AgentError::Configuration("ANTHROPIC_API_KEY is required".to_string())
            })?;
            let client = AnthropicClient::new(api_key, &config.model, config.temperature);
            tracing::info!("Initialized LLM client with model: {}", config.model);
            Ok(Arc::new(client))
        }
        LlmProvider::Ollama => {
            let client = OllamaClient::new(&config.ollama_url, &config.model);
            tracing::info!(
                "Initialized Ollama client at {} with model: {}",
                config.ollama_url,
                config.model
            );
            Ok(Arc::new(client))
        }
    }
}

/// First `max` characters of model output, for log lines
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
