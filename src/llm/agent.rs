use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::client::{extract_message_content, ChatClient, ChatCompletionRequest};
use crate::config::{Settings, DEFAULT_MODEL};
use crate::error::Result;

/// Anything that can turn a system prompt plus a user turn into text.
///
/// The parser only assumes "returns text"; implementations are free to talk
/// to a hosted model, a local one, or return canned replies in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<String>;
}

/// Single-turn chat agent backed by an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct ChatAgent {
    client: ChatClient,
    model: String,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl ChatAgent {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: ChatClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build an agent from loaded settings. Fails when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_llm_api_key()?;
        Ok(Self::new(api_key)
            .with_model(settings.llm_model.clone())
            .with_base_url(settings.llm_base_url.clone())
            .with_timeout(settings.llm_timeout))
    }
}

#[async_trait]
impl TextGenerator for ChatAgent {
    async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        let messages = vec![
            json!({
                "role": "system",
                "content": system_prompt
            }),
            json!({
                "role": "user",
                "content": user_text
            }),
        ];

        let request_body = ChatCompletionRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.max_tokens)
            .into_value();

        let response = self
            .client
            .chat_completion(&request_body, self.timeout)
            .await?;
        let content = extract_message_content(&response)?;

        debug!(
            target: "trip_agent::llm",
            model = %self.model,
            chars = content.chars().count(),
            "received completion"
        );

        Ok(content)
    }
}
