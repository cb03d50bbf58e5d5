use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::generate::{GenerationRequest, Generator};
use crate::http;
use crate::{Error, Result};

/// Settings for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct OpenAiGeneratorConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiGeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking client for OpenAI-compatible `/chat/completions`.
///
/// The prompt is sent as a single user message.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiGeneratorConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::Config("missing chat model name".to_string()));
        }
        let client = http::bearer_client("OpenAI", &config.api_key, config.timeout)?;

        Ok(Self {
            client,
            endpoint: http::endpoint(&config.base_url, "chat/completions"),
            model: config.model,
        })
    }
}

impl Generator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
        };
        tracing::debug!(model = %self.model, max_tokens = request.max_tokens, "calling chat completions");

        let response: ChatResponse =
            http::post_json(&self.client, &self.endpoint, &body).map_err(Error::Generation)?;
        response.into_text()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("response missing message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_provider_default_temperature() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            max_tokens: 200,
            temperature: None,
            messages: vec![ChatMessage {
                role: "user",
                content: "prompt",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["max_tokens"], 200);
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "prompt");
    }

    #[test]
    fn test_response_text() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"O sertão é árido."},"finish_reason":"length"}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "O sertão é árido.");
    }

    #[test]
    fn test_response_without_content() {
        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(Error::Generation(_))));

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(null.into_text(), Err(Error::Generation(_))));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = OpenAiGenerator::new(OpenAiGeneratorConfig::new(" ")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
