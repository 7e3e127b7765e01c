//! Configuration for batch runs
//!
//! Controls segmentation mode, pacing, output location and failure handling.

use neurotab_domain::ProcessingMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default pause after each paper (seconds)
pub const DEFAULT_DELAY_SECS: f64 = 0.8;

/// Default output path
pub const DEFAULT_OUTPUT: &str = "extracted_info.csv";

/// What to do when a paper's extraction fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, emit no row for the paper, keep going
    #[default]
    Skip,

    /// Stop the batch at the first failed paper
    Abort,
}

impl FailurePolicy {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Skip => "skip",
            FailurePolicy::Abort => "abort",
        }
    }

    /// Parse a policy name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" | "continue" => Some(FailurePolicy::Skip),
            "abort" | "stop" => Some(FailurePolicy::Abort),
            _ => None,
        }
    }
}

/// Configuration for the [`BatchRunner`](crate::BatchRunner)
///
/// # Examples
///
/// ```
/// use neurotab_pipeline::{BatchConfig, FailurePolicy};
///
/// let config = BatchConfig::default();
/// assert_eq!(config.delay_secs, 0.8);
/// assert_eq!(config.failure_policy, FailurePolicy::Skip);
///
/// // No pacing, for mock providers and local models
/// let config = BatchConfig::unpaced();
/// assert_eq!(config.delay_secs, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// How papers are cut into chunks
    pub mode: ProcessingMode,

    /// Pause after each paper, including the last (seconds)
    pub delay_secs: f64,

    /// CSV destination, overwritten on every run
    pub output: PathBuf,

    /// Behaviour when a paper fails
    pub failure_policy: FailurePolicy,

    /// Write the header up front and flush each row as its paper completes
    pub incremental_flush: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::default(),
            delay_secs: DEFAULT_DELAY_SECS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            failure_policy: FailurePolicy::Skip,
            incremental_flush: true,
        }
    }
}

impl BatchConfig {
    /// No pacing between papers
    pub fn unpaced() -> Self {
        Self {
            delay_secs: 0.0,
            ..Self::default()
        }
    }

    /// Abort on the first failure and write the file once at the end
    pub fn strict() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            incremental_flush: false,
            ..Self::default()
        }
    }

    /// Pause after each paper as a Duration
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return Err(format!(
                "delay_secs must be a non-negative number, got {}",
                self.delay_secs
            ));
        }
        if Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(format!("delay_secs is too large, got {}", self.delay_secs));
        }
        if self.output.as_os_str().is_empty() {
            return Err("output path must not be empty".to_string());
        }
        Ok(())
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
