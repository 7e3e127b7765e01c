//! OpenAI Provider Implementation
//!
//! Sends chat completions to the OpenAI REST API (or any compatible endpoint).
//!
//! # Examples
//!
//! ```no_run
//! use neurotab_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//! ```

use crate::backoff::with_attempts;
use crate::http::build_client;
use crate::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for one request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    max_attempts: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider for `model` authenticated with `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
            max_attempts: 1,
        }
    }

    /// Read the API key from the environment variable `var`
    pub fn from_env(var: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(var)
            .map_err(|_| LlmError::Config(format!("{} not set", var)))?;
        if api_key.trim().is_empty() {
            return Err(LlmError::Config(format!("{} is empty", var)));
        }
        Ok(Self::new(api_key, model))
    }

    /// Use a different API base URL (proxies, Azure, compatible servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    /// Set the number of attempts for transient failures (1 = no retry)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The API base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::Config("API key rejected".to_string()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let content =
            with_attempts(self.max_attempts, "openai.chat", || self.send_once(request)).await?;
        debug!(model = %self.model, chars = content.len(), "OpenAI chat completion");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
