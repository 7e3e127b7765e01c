//! Configuration management for the CLI.
//!
//! Lookup order: an explicit `--config` path, then `./neurotab.toml`, then
//! `~/.neurotab/config.toml`, else built-in defaults.

use crate::error::{CliError, Result};
use neurotab_domain::ExtractionSchema;
use neurotab_extractor::ExtractorConfig;
use neurotab_llm::openai::{DEFAULT_API_KEY_ENV, DEFAULT_MODEL};
use neurotab_pipeline::BatchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "neurotab.toml";

/// Default corpus location.
pub const DEFAULT_INPUT: &str = "data/processed/whitematter_data.json";

/// Default schema preset.
pub const DEFAULT_SCHEMA_PRESET: &str = "white-matter";

/// Commented starter file written by `neurotab init`.
pub const STARTER_CONFIG: &str = r#"# neurotab configuration

[llm]
# openai, ollama or mock
provider = "openai"
model = "gpt-4o-mini"
# Environment variable holding the API key (a .env file is read too)
api_key_env = "OPENAI_API_KEY"
# endpoint = "http://localhost:11434"
# timeout_secs = 60
# 1 means no retries
max_attempts = 1

[corpus]
input = "data/processed/whitematter_data.json"
offset = 0
# limit = 3

[pipeline]
# no-chunk, chunk or metadata-only
mode = "no-chunk"
delay_secs = 0.8
output = "extracted_info.csv"
# skip or abort
failure_policy = "skip"
incremental_flush = true

[extractor]
lenient_json = true

[schema]
# white-matter or core
preset = "white-matter"
# file = "schema.toml"

[settings]
color = true
format = "table"
progress = true
"#;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Input corpus settings
    #[serde(default)]
    pub corpus: CorpusSettings,

    /// Batch run settings
    #[serde(default)]
    pub pipeline: BatchConfig,

    /// Extractor settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Schema selection
    #[serde(default)]
    pub schema: SchemaSettings,

    /// Display settings
    #[serde(default)]
    pub settings: Settings,
}

/// Which LLM backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ProviderKind {
    /// OpenAI chat completions
    #[default]
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,

    /// Local Ollama server
    #[serde(rename = "ollama")]
    Ollama,

    /// Canned responses, no network
    #[serde(rename = "mock")]
    Mock,
}

impl ProviderKind {
    /// Get the provider name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Mock => "mock",
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Backend
    pub provider: ProviderKind,

    /// Model identifier
    pub model: String,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the OpenAI API key
    pub api_key_env: String,

    /// HTTP timeout override (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Attempts per call, 1 disables retries
    pub max_attempts: u32,

    /// Response returned by the mock provider
    pub mock_response: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: None,
            max_attempts: 1,
            mock_response: "{}".to_string(),
        }
    }
}

/// Input corpus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// JSON array of paper records
    pub input: PathBuf,

    /// Papers skipped from the start
    pub offset: usize,

    /// Maximum papers processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            offset: 0,
            limit: None,
        }
    }
}

/// Schema selection: a preset name, or a TOML file that takes precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Built-in preset name
    pub preset: String,

    /// Custom schema file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            preset: DEFAULT_SCHEMA_PRESET.to_string(),
            file: None,
        }
    }
}

impl SchemaSettings {
    /// Load and validate the selected schema.
    pub fn resolve(&self) -> Result<ExtractionSchema> {
        let schema = match &self.file {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("Cannot read schema {}: {}", path.display(), e))
                })?;
                ExtractionSchema::from_toml(&contents)?
            }
            None => ExtractionSchema::preset(&self.preset).ok_or_else(|| {
                CliError::Config(format!(
                    "Unknown schema preset '{}' (available: {})",
                    self.preset,
                    ExtractionSchema::preset_names().join(", ")
                ))
            })?,
        };
        schema.validate()?;
        Ok(schema)
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Show a progress bar during batch runs
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            progress: true,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Candidate config paths, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".neurotab").join("config.toml"));
        }
        paths
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the first existing search
    /// path is used, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        if self.llm.max_attempts == 0 {
            return Err(CliError::Config("llm.max_attempts must be at least 1".into()));
        }
        if self.llm.timeout_secs == Some(0) {
            return Err(CliError::Config("llm.timeout_secs must be greater than 0".into()));
        }
        self.pipeline.validate().map_err(CliError::Config)?;
        self.extractor.validate().map_err(CliError::Config)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurotab_domain::ProcessingMode;
    use neurotab_pipeline::FailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_attempts, 1);
        assert_eq!(config.pipeline.output, PathBuf::from("extracted_info.csv"));
        assert_eq!(config.schema.preset, "white-matter");
        assert!(config.settings.color);
    }

    #[test]
    fn test_starter_config_matches_defaults() {
        let config = Config::from_toml(STARTER_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [llm]
            provider = "ollama"
            model = "llama3.1"

            [pipeline]
            mode = "chunk"
            failure_policy = "abort"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.pipeline.mode, ProcessingMode::Chunk);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.pipeline.delay_secs, 0.8);
        assert!(config.extractor.lenient_json);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml("[llm]\nprovider = \"anthropic\"");
        assert!(matches!(result, Err(CliError::Toml(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.llm.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_delay() {
        let mut config = Config::default();
        config.pipeline.delay_secs = -1.0;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[corpus]\nlimit = 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.corpus.limit, Some(3));
        assert_eq!(config.corpus.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.llm.endpoint = Some("http://localhost:11434".into());
        config.corpus.limit = Some(10);
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_schema_presets_resolve() {
        let settings = SchemaSettings::default();
        assert_eq!(settings.resolve().unwrap().len(), 11);

        let settings = SchemaSettings {
            preset: "core".into(),
            file: None,
        };
        assert_eq!(settings.resolve().unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_schema_preset() {
        let settings = SchemaSettings {
            preset: "grey-matter".into(),
            file: None,
        };
        let err = settings.resolve().unwrap_err();
        assert!(err.to_string().contains("white-matter"));
    }

    #[test]
    fn test_schema_file_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(
            &path,
            r#"
            [[fields]]
            name = "species"
            examples = ["humans", "macaques"]
            "#,
        )
        .unwrap();

        let settings = SchemaSettings {
            preset: "core".into(),
            file: Some(path),
        };
        let schema = settings.resolve().unwrap();
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["species"]);
    }

    #[test]
    fn test_invalid_schema_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(&path, "[[fields]]\nname = \"pmcid\"\n").unwrap();

        let settings = SchemaSettings {
            preset: "core".into(),
            file: Some(path),
        };
        assert!(matches!(settings.resolve(), Err(CliError::Schema(_))));
    }
}
