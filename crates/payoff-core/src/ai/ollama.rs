//! Ollama backend implementation
//!
//! Calls `/api/generate` with JSON output mode. The reply text is returned
//! untouched; parsing happens in the validator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{CoachBackend, GenerateOptions};

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Pull the generated text out of an `/api/generate` body
fn parse_response(body: &str) -> Result<String> {
    let parsed: OllamaResponse = serde_json::from_str(body)?;
    Ok(parsed.response)
}

#[async_trait]
impl CoachBackend for OllamaBackend {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("Ollama API error {}: {}", status, body)));
        }

        let text = parse_response(&response.text().await?)?;
        debug!("Ollama response: {}", text);

        Ok(text)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
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
    fn test_trailing_slash_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.with_model("gemma3").model(), "gemma3");
    }

    #[test]
    fn test_request_shape() {
        let request = OllamaRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 200,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "json");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 200);
    }

    #[test]
    fn test_response_parsing() {
        let text = parse_response(r#"{"model":"llama3.2","response":"{\"nudge\":\"Hi\",\"cta\":\"Go\"}","done":true}"#).unwrap();
        assert_eq!(text, r#"{"nudge":"Hi","cta":"Go"}"#);

        let err = parse_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let backend = OllamaBackend::new("http://127.0.0.1:9", "llama3.2");
        assert!(!backend.health_check().await);
        assert!(backend
            .generate("hi", &GenerateOptions::default())
            .await
            .is_err());
    }
}
