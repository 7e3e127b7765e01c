//! Ollama Provider Implementation
//!
//! Runs extraction against a local Ollama instance through its chat API.
//!
//! # Features
//!
//! - JSON-constrained output (`"format": "json"`)
//! - Configurable endpoint and model
//! - Optional retry with exponential backoff for transient failures
//!
//! # Examples
//!
//! ```no_run
//! use neurotab_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1");
//! ```

use crate::backoff::with_attempts;
use crate::http::build_client;
use crate::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds, local models are slow on long bodies)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_attempts: u32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [OllamaMessage<'a>; 2],
    stream: bool,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
            max_attempts: 1,
        }
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the number of attempts for transient failures (1 = no retry)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages: [
                OllamaMessage {
                    role: "system",
                    content: &request.system,
                },
                OllamaMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            stream: false,
            format: "json",
            options: request
                .temperature()
                .map(|temperature| OllamaOptions { temperature }),
        }
    }

    async fn chat_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(chat.message.content)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let content =
            with_attempts(self.max_attempts, "ollama.chat", || self.chat_once(request)).await?;
        debug!(model = %self.model, chars = content.len(), "Ollama chat completion");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
