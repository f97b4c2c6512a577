//! Mock backend for testing
//!
//! Replays canned responses in order, cycling when it runs out. Can be
//! told to fail or to stall so timeout handling can be exercised without
//! a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{CoachBackend, GenerateOptions};

/// Default reply: qualitative, so it validates against any fact set
const DEFAULT_RESPONSE: &str =
    r#"{"nudge":"You're making steady progress. Keep it up!","cta":"View plan"}"#;

/// Mock LLM backend for testing
#[derive(Clone)]
pub struct MockBackend {
    responses: Arc<Vec<String>>,
    cursor: Arc<AtomicUsize>,
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fail every generate call with this message
    pub failure: Option<String>,
    /// Sleep before answering
    pub delay: Option<Duration>,
    /// Prompts received, for assertions
    prompts: Arc<std::sync::Mutex<Vec<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_responses(vec![DEFAULT_RESPONSE.to_string()])
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }

    /// Answer with `responses` in order, cycling
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(responses),
            cursor: Arc::new(AtomicUsize::new(0)),
            healthy: true,
            failure: None,
            delay: None,
            prompts: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose generate calls fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Delay every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of generate calls so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Last prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

#[async_trait]
impl CoachBackend for MockBackend {
    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(ref message) = self.failure {
            return Err(Error::Llm(message.clone()));
        }

        if self.responses.is_empty() {
            return Ok(DEFAULT_RESPONSE.to_string());
        }
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(self.responses[n % self.responses.len()].clone())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://"
    }
}
