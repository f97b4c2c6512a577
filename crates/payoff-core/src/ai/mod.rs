//! Pluggable LLM backends for nudge generation
//!
//! The model only ever proposes text; everything it returns goes through
//! [`crate::nudge::NudgeValidator`] before a user can see it.
//!
//! # Architecture
//!
//! - `CoachBackend` trait: one-shot text generation plus a health check
//! - `CoachClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::config::CoachSettings;
use crate::error::Result;

/// Sampling options for a single generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from(&CoachSettings::default())
    }
}

impl From<&CoachSettings> for GenerateOptions {
    fn from(settings: &CoachSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Interface every LLM backend implements
///
/// One call, one complete text reply. No streaming and no retries.
#[async_trait]
pub trait CoachBackend: Send + Sync {
    /// Generate raw text for `prompt`
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Model name, for logging
    fn model(&self) -> &str;

    /// Server URL, for logging
    fn host(&self) -> &str;
}

/// Concrete backend wrapper
#[derive(Clone)]
pub enum CoachClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl CoachClient {
    /// Create a client from environment variables
    ///
    /// Returns None if the selected backend is missing its host variable.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(CoachClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(CoachClient::OpenAICompatible)
            }
            "mock" => Some(CoachClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(CoachClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        CoachClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock(mock: MockBackend) -> Self {
        CoachClient::Mock(mock)
    }

    /// Short backend name
    pub fn kind(&self) -> &'static str {
        match self {
            CoachClient::Ollama(_) => "ollama",
            CoachClient::OpenAICompatible(_) => "openai_compatible",
            CoachClient::Mock(_) => "mock",
        }
    }
}

#[async_trait]
impl CoachBackend for CoachClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        match self {
            CoachClient::Ollama(b) => b.generate(prompt, options).await,
            CoachClient::OpenAICompatible(b) => b.generate(prompt, options).await,
            CoachClient::Mock(b) => b.generate(prompt, options).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            CoachClient::Ollama(b) => b.health_check().await,
            CoachClient::OpenAICompatible(b) => b.health_check().await,
            CoachClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            CoachClient::Ollama(b) => b.model(),
            CoachClient::OpenAICompatible(b) => b.model(),
            CoachClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            CoachClient::Ollama(b) => b.host(),
            CoachClient::OpenAICompatible(b) => b.host(),
            CoachClient::Mock(b) => b.host(),
        }
    }
}
