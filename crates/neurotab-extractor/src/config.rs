//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the [`FieldExtractor`](crate::FieldExtractor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Strip a surrounding markdown code fence before decoding the response
    pub lenient_json: bool,

    /// Maximum time for a single LLM call (seconds)
    pub extraction_timeout_secs: u64,

    /// Characters of an undecodable response kept for logs and failure records
    pub raw_log_limit: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.raw_log_limit == 0 {
            return Err("raw_log_limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            lenient_json: true,
            extraction_timeout_secs: 300,
            raw_log_limit: 500,
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: raw JSON decoding only, shorter timeout
    pub fn strict() -> Self {
        Self {
            lenient_json: false,
            extraction_timeout_secs: 120,
            raw_log_limit: 200,
        }
    }

    /// Lenient preset: fence stripping, long timeout, more raw content in logs
    pub fn lenient() -> Self {
        Self {
            lenient_json: true,
            extraction_timeout_secs: 600,
            raw_log_limit: 2_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
