use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::DEFAULT_BASE_URL;
use crate::error::{AgentError, Result};

/// Thin HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Every call is a single request: failures are reported to the caller as-is
/// and nothing is retried.
#[derive(Clone, Debug)]
pub struct ChatClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Option<Duration>) -> Result<Value> {
        let request_url = build_chat_url(&self.base_url);
        debug!(target: "trip_agent::llm", url = %request_url, "sending chat completion");

        let mut request = self
            .http
            .post(&request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "trip-request-agent")
            .json(body);

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AgentError::Http(format!("HTTP request failed: {err}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|err| AgentError::Http(format!("Failed to read response: {err}")))?;

        if !status.is_success() {
            let api_message = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|error| error.get("message"))
                        .and_then(|value| value.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or_else(|| response_text.clone());

            return Err(AgentError::Api(format!("HTTP {} error: {}", status, api_message)));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|err| AgentError::Api(format!("Failed to parse JSON: {err}")))?;

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(AgentError::Api(format!("API error: {}", error_message)));
        }

        Ok(response_json)
    }
}

pub(crate) fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Pull the assistant text out of a completion response.
pub(crate) fn extract_message_content(response: &Value) -> Result<String> {
    let first_choice = response
        .get("choices")
        .and_then(|value| value.as_array())
        .and_then(|choices| choices.first())
        .ok_or_else(|| AgentError::Api("Completion response contained no choices".to_string()))?;

    first_choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|content| content.to_string())
        .ok_or_else(|| {
            AgentError::Api("Completion response missing assistant message content".to_string())
        })
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("https://openrouter.ai/api/v1/"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost:8080/v1/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_omits_unset_fields() {
        let body = ChatCompletionRequest::new("m", vec![json!({"role": "user", "content": "hi"})])
            .into_value();
        assert_eq!(body["model"], "m");
        assert!(body.get("max_tokens").is_none());

        let body = ChatCompletionRequest::new("m", Vec::new())
            .with_max_tokens(Some(256))
            .into_value();
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_extract_message_content() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        });
        assert_eq!(extract_message_content(&response).unwrap(), "hello");

        let empty = json!({"choices": []});
        assert!(extract_message_content(&empty).is_err());

        let no_content = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert!(extract_message_content(&no_content).is_err());
    }

    #[tokio::test]
    async fn test_chat_completion_reports_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "invalid api key"}}"#)
            .create_async()
            .await;

        let mut client = ChatClient::new("bad-key");
        client.set_base_url(format!("{}/v1", server.url()));

        let err = client
            .chat_completion(&json!({"model": "m", "messages": []}), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "LLM_API_ERROR");
        assert!(err.to_string().contains("invalid api key"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_completion_single_attempt_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream down")
            .expect(1)
            .create_async()
            .await;

        let mut client = ChatClient::new("key");
        client.set_base_url(server.url());

        let err = client
            .chat_completion(&json!({"model": "m", "messages": []}), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upstream down"));
        mock.assert_async().await;
    }
}
