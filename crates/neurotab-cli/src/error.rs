//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] neurotab_llm::LlmError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extractor(#[from] neurotab_extractor::ExtractorError),

    /// Batch pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] neurotab_pipeline::PipelineError),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] neurotab_domain::SchemaError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
