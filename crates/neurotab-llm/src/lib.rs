//! neurotab LLM Provider Layer
//!
//! Pluggable chat-completion backends behind one async trait.
//!
//! # Architecture
//!
//! The extractor only ever sees [`LlmProvider`]: it hands over a system
//! instruction and a JSON user payload and gets raw text back. Whether that
//! text is valid JSON is the caller's problem.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing and dry runs
//! - `OpenAiProvider`: OpenAI chat completions API
//! - `OllamaProvider`: Local Ollama chat API
//!
//! # Examples
//!
//! ```
//! use neurotab_llm::{CompletionRequest, LlmProvider, MockProvider};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new(r#"{"subjects": ["humans"]}"#);
//! let request = CompletionRequest::new("system", r#"{"body": "text"}"#);
//! let content = provider.complete(&request).await.unwrap();
//! assert_eq!(content, r#"{"subjects": ["humans"]}"#);
//! # }
//! ```

#![warn(missing_docs)]

mod backoff;
mod http;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response envelope from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether a repeated attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// One chat completion call: a system instruction and a user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instruction (schema and extraction rules)
    pub system: String,

    /// User message (JSON-encoded payload)
    pub user: String,

    /// Request the provider's most deterministic sampling (temperature 0)
    pub deterministic: bool,
}

impl CompletionRequest {
    /// Create a deterministic request
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            deterministic: true,
        }
    }

    /// Set the determinism flag
    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    /// Sampling temperature implied by the determinism flag
    pub fn temperature(&self) -> Option<f32> {
        self.deterministic.then_some(0.0)
    }
}

/// A chat-completion backend
///
/// Implementations return the assistant message content untouched.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the raw content
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: LlmProvider + ?Sized> LlmProvider for Box<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: LlmProvider + ?Sized> LlmProvider for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Rules are matched in insertion order against the user message: the first
/// rule whose needle occurs in the message wins, otherwise the default
/// response is returned.
///
/// # Examples
///
/// ```
/// use neurotab_llm::{CompletionRequest, LlmProvider, MockProvider};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut provider = MockProvider::new("{}");
/// provider.add_response("Methods", r#"{"analysis_software": ["FSL"]}"#);
///
/// let request = CompletionRequest::new("sys", r#"{"body": "Methods text"}"#);
/// assert_eq!(
///     provider.complete(&request).await.unwrap(),
///     r#"{"analysis_software": ["FSL"]}"#
/// );
/// assert_eq!(provider.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `response` when the user message contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((needle.into(), MockReply::Content(response.into())));
        }
    }

    /// Fail with [`LlmError::Other`] when the user message contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((needle.into(), MockReply::Error));
        }
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.clear();
        }
    }

    fn reply_for(&self, user: &str) -> MockReply {
        self.rules
            .lock()
            .ok()
            .and_then(|rules| {
                rules
                    .iter()
                    .find(|(needle, _)| user.contains(needle.as_str()))
                    .map(|(_, reply)| reply.clone())
            })
            .unwrap_or_else(|| MockReply::Content(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.reply_for(&request.user) {
            MockReply::Content(content) => Ok(content),
            MockReply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::new("system", user)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("anything")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("say hello")).await.unwrap(), "world");
        assert_eq!(provider.complete(&request("foo!")).await.unwrap(), "bar");
        assert_eq!(provider.complete(&request("unknown")).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("a", "first");
        provider.add_response("ab", "second");

        assert_eq!(provider.complete(&request("ab")).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_mock_provider_records_requests() {
        let provider = MockProvider::new("ok");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("one")).await.unwrap();
        provider.complete(&request("two")).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        let users: Vec<_> = provider.requests().into_iter().map(|r| r.user).collect();
        assert_eq!(users, vec!["one", "two"]);

        provider.reset();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad");

        let result = provider.complete(&request("bad chunk")).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("x")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_boxed_provider() {
        let provider: Box<dyn LlmProvider> = Box::new(MockProvider::new("boxed"));
        assert_eq!(provider.complete(&request("x")).await.unwrap(), "boxed");
        assert_eq!(provider.model_name(), "mock");
    }

    #[test]
    fn test_request_temperature() {
        assert_eq!(request("x").temperature(), Some(0.0));
        assert_eq!(request("x").with_deterministic(false).temperature(), None);
    }

    #[test]
    fn test_transient_errors() {
        assert!(LlmError::RateLimitExceeded.is_transient());
        assert!(LlmError::Communication("x".into()).is_transient());
        assert!(!LlmError::ModelNotAvailable("m".into()).is_transient());
    }
}
