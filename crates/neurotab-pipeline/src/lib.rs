//! neurotab Pipeline
//!
//! Batch extraction over a paper corpus with CSV output.
//!
//! # Overview
//!
//! The pipeline is responsible for:
//! - **Corpus loading**: reading the ETL's JSON array of papers
//! - **Batch control**: extracting papers one at a time, in input order, with a
//!   pause after each paper to stay under provider rate limits
//! - **Failure handling**: skipping or aborting on a failed paper
//! - **Tabular output**: writing `pmcid`, `title` and one `;`-joined column per
//!   schema field to CSV
//! - **Metrics collection**: counters for the run summary
//!
//! # Usage
//!
//! ```no_run
//! use neurotab_domain::ExtractionSchema;
//! use neurotab_extractor::{ExtractorConfig, FieldExtractor};
//! use neurotab_llm::OpenAiProvider;
//! use neurotab_pipeline::{load_papers, BatchConfig, BatchRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let papers = load_papers("data/processed/whitematter_data.json")?;
//!
//!     let llm = OpenAiProvider::from_env("OPENAI_API_KEY", "gpt-4o-mini")?;
//!     let extractor = FieldExtractor::new(
//!         llm,
//!         ExtractionSchema::white_matter(),
//!         ExtractorConfig::default(),
//!     )?;
//!     let runner = BatchRunner::new(extractor, BatchConfig::default())?;
//!
//!     let report = runner.run_to_csv(&papers, "extracted_info.csv").await?;
//!     println!("{}", report.metrics.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! mode = "chunk"
//! delay_secs = 0.8
//! output = "extracted_info.csv"
//! failure_policy = "skip"
//! incremental_flush = true
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod runner;
mod sink;
mod source;

pub use config::{BatchConfig, FailurePolicy, DEFAULT_DELAY_SECS, DEFAULT_OUTPUT};
pub use error::PipelineError;
pub use metrics::BatchMetrics;
pub use runner::{BatchReport, BatchRunner, PaperFailure, Progress};
pub use sink::{write_rows, CsvSink};
pub use source::{load_papers, parse_papers, select};
