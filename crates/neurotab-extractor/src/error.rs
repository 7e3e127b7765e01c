//! Error types for the Extractor

use neurotab_domain::SchemaError;
use neurotab_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// Only [`ExtractorError::Llm`] and [`ExtractorError::Timeout`] escape a
/// paper extraction. Undecodable responses are recovered per chunk.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// LLM call exceeded the configured timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// Response decoded but is not a JSON object
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Extraction schema is malformed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
