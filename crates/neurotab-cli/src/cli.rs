//! CLI command definitions and argument parsing.

use crate::config::{Config, OutputFormat, ProviderKind};
use clap::{Args, Parser, Subcommand};
use neurotab_domain::ProcessingMode;
use neurotab_pipeline::FailurePolicy;
use std::path::PathBuf;

/// neurotab - Extract neuroimaging metadata from papers into a CSV table.
#[derive(Debug, Parser)]
#[command(name = "neurotab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract every selected paper and write the CSV table
    Run(RunArgs),

    /// Extract a single paper and print its values
    Extract(ExtractArgs),

    /// Show how a paper is cut into chunks (no LLM calls)
    Segment(SegmentArgs),

    /// Show the active schema or its system prompt
    Schema(SchemaArgs),

    /// Write a starter configuration file
    Init(InitArgs),
}

/// Corpus and processing options shared by the paper commands.
#[derive(Debug, Default, Args)]
pub struct CorpusArgs {
    /// Corpus JSON file (array of paper records)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Processing mode: no-chunk, chunk or metadata-only (1, 2, 3 also accepted)
    #[arg(short, long)]
    pub mode: Option<ProcessingMode>,

    /// Schema preset (white-matter, core)
    #[arg(long, conflicts_with = "schema_file")]
    pub schema: Option<String>,

    /// Custom schema TOML file
    #[arg(long)]
    pub schema_file: Option<PathBuf>,
}

impl CorpusArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.corpus.input = input.clone();
        }
        if let Some(mode) = self.mode {
            config.pipeline.mode = mode;
        }
        if let Some(preset) = &self.schema {
            config.schema.preset = preset.clone();
            config.schema.file = None;
        }
        if let Some(file) = &self.schema_file {
            config.schema.file = Some(file.clone());
        }
    }
}

/// LLM options shared by the commands that call the model.
#[derive(Debug, Default, Args)]
pub struct LlmArgs {
    /// LLM backend
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the LLM API
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Attempts per LLM call (1 = no retries)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Strip markdown code fences before decoding responses
    #[arg(long)]
    pub lenient_json: Option<bool>,
}

impl LlmArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = Some(endpoint.clone());
        }
        if let Some(attempts) = self.max_attempts {
            config.llm.max_attempts = attempts;
        }
        if let Some(lenient) = self.lenient_json {
            config.extractor.lenient_json = lenient;
        }
    }
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// CSV output path (overwritten)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pause after each paper (seconds)
    #[arg(short, long)]
    pub delay: Option<f64>,

    /// Skip this many papers from the start
    #[arg(long)]
    pub offset: Option<usize>,

    /// Process at most this many papers
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// What to do when a paper fails
    #[arg(long, value_enum)]
    pub failure_policy: Option<PolicyArg>,

    /// Write the CSV once at the end instead of row by row
    #[arg(long)]
    pub buffered: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        self.corpus.apply(config);
        self.llm.apply(config);
        if let Some(output) = &self.output {
            config.pipeline.output = output.clone();
        }
        if let Some(delay) = self.delay {
            config.pipeline.delay_secs = delay;
        }
        if let Some(offset) = self.offset {
            config.corpus.offset = offset;
        }
        if let Some(limit) = self.limit {
            config.corpus.limit = Some(limit);
        }
        if let Some(policy) = self.failure_policy {
            config.pipeline.failure_policy = policy.into();
        }
        if self.buffered {
            config.pipeline.incremental_flush = false;
        }
        if self.no_progress {
            config.settings.progress = false;
        }
    }
}

/// Failure policy options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PolicyArg {
    /// Log the failure and continue with the next paper
    Skip,
    /// Stop at the first failed paper
    Abort,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Skip => FailurePolicy::Skip,
            PolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Position of the paper in the corpus (0-based)
    #[arg(long, conflicts_with = "pmcid")]
    pub index: Option<usize>,

    /// Paper identifier
    #[arg(long)]
    pub pmcid: Option<String>,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Arguments for the segment command.
#[derive(Debug, Parser)]
pub struct SegmentArgs {
    /// Position of the paper in the corpus (0-based)
    #[arg(long, conflicts_with = "pmcid")]
    pub index: Option<usize>,

    /// Paper identifier
    #[arg(long)]
    pub pmcid: Option<String>,

    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// Schema preset (white-matter, core)
    #[arg(long, conflicts_with = "schema_file")]
    pub schema: Option<String>,

    /// Custom schema TOML file
    #[arg(long)]
    pub schema_file: Option<PathBuf>,

    /// Print the system prompt sent to the LLM
    #[arg(long, conflicts_with = "toml")]
    pub prompt: bool,

    /// Print the schema as TOML (a starting point for custom schemas)
    #[arg(long)]
    pub toml: bool,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Destination
    #[arg(default_value = crate::config::LOCAL_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "neurotab", "run", "--input", "papers.json", "--mode", "3", "--limit", "3",
            "--delay", "0", "--failure-policy", "abort", "--provider", "mock",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.corpus.input, PathBuf::from("papers.json"));
        assert_eq!(config.pipeline.mode, ProcessingMode::MetadataOnly);
        assert_eq!(config.corpus.limit, Some(3));
        assert_eq!(config.pipeline.delay_secs, 0.0);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.llm.provider, ProviderKind::Mock);
        assert!(config.pipeline.incremental_flush);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let cli = Cli::try_parse_from(["neurotab", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_schema_preset_clears_file() {
        let mut config = Config::default();
        config.schema.file = Some(PathBuf::from("custom.toml"));

        let args = CorpusArgs {
            schema: Some("core".into()),
            ..CorpusArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.schema.preset, "core");
        assert!(config.schema.file.is_none());
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Cli::try_parse_from(["neurotab", "segment", "--mode", "paragraphs"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_index_and_pmcid_conflict() {
        let result =
            Cli::try_parse_from(["neurotab", "extract", "--index", "0", "--pmcid", "PMC1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["neurotab", "schema", "--prompt", "-v", "--format", "json"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_init_default_path() {
        let cli = Cli::try_parse_from(["neurotab", "init"]).unwrap();
        let Command::Init(args) = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(args.path, PathBuf::from("neurotab.toml"));
        assert!(!args.force);
    }
}
