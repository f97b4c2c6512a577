//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{CoachBackend, GenerateOptions};

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        Some(Self::new(&host, &model, api_key))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// First choice's message content from a chat completion body
fn parse_completion(body: &str) -> Result<String> {
    let chat_response: ChatCompletionResponse = serde_json::from_str(body)?;
    chat_response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| Error::Llm("No response from OpenAI API".into()))
}

#[async_trait]
impl CoachBackend for OpenAICompatibleBackend {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("OpenAI API error {}: {}", status, body)));
        }

        let content = parse_completion(&response.text().await?)?;
        debug!("OpenAI-compatible response: {}", content);

        Ok(content)
    }

    async fn health_check(&self) -> bool {
        // Try /v1/models first (standard OpenAI endpoint)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        // Try /health (common for LocalAI, llama-server)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.7,
            max_tokens: 200,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 200);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"nudge\":\"Hi\",\"cta\":\"Go\"}"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), r#"{"nudge":"Hi","cta":"Go"}"#);

        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(Error::Llm(_))
        ));
        assert!(matches!(
            parse_completion("upstream timed out"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_with_model_keeps_key() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8000/", "a", Some("k".into()));
        let other = backend.with_model("b");
        assert_eq!(other.model(), "b");
        assert_eq!(other.host(), "http://localhost:8000");
        assert_eq!(other.api_key.as_deref(), Some("k"));
    }
}
