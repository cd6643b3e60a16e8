//! Anthropic Messages API client
//!
//! Direct HTTP calls via reqwest; only the fields the agent needs are modeled.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{preview, Llm};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Request body for `POST /v1/messages`
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Anthropic client
pub struct AnthropicClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl AnthropicClient {
    pub fn new(api_key: &str, model: &str, temperature: f32) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        }
    }

    /// Point at a different API host (proxies, gateways)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, system: Option<&'a str>, user: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            system,
            messages: vec![ApiMessage {
                role: "user",
                content: user,
            }],
        }
    }

    async fn send(&self, request: MessagesRequest<'_>) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to send HTTP request to Anthropic")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("LLM generation failed: {} {}", status, body);
            return Err(anyhow::anyhow!("Anthropic API error {}: {}", status, body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        let text = body.text().trim().to_string();
        if text.is_empty() {
            return Err(anyhow::anyhow!("Anthropic response contained no text"));
        }
        tracing::info!("Generated SQL query: {}", preview(&text, 100));
        Ok(text)
    }
}

#[async_trait]
impl Llm for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Sending request to LLM for SQL generation");
        self.send(self.request(None, prompt)).await
    }

    async fn generate_with_system(&self, system: &str, user: &str) -> Result<String> {
        tracing::info!("Sending request to LLM with system message");
        self.send(self.request(Some(system), user)).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
