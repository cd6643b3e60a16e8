//! Ollama LLM implementation

use anyhow::Result;
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};
use url::Url;

use super::{preview, Llm};

/// Ollama client wrapper
pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(url: &str, model: &str) -> Self {
        let client = match Url::parse(url) {
            Ok(url) => Ollama::from_url(url),
            Err(e) => {
                tracing::warn!("Invalid Ollama URL '{}': {}. Using default.", url, e);
                Ollama::default()
            }
        };

        Self {
            client,
            model: model.to_string(),
        }
    }

    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);
        let response = self.client.send_chat_messages(request).await.map_err(|e| {
            tracing::error!("LLM generation failed: {}", e);
            e
        })?;

        let text = response.message.content.trim().to_string();
        tracing::info!("Generated SQL query: {}", preview(&text, 100));
        Ok(text)
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Sending request to LLM for SQL generation");
        self.send(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, user: &str) -> Result<String> {
        tracing::info!("Sending request to LLM with system message");
        self.send(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(user.to_string()),
        ])
        .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
