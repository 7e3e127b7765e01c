//! neurotab Extractor
//!
//! Converts paper text into schema field values using an LLM.
//!
//! # Overview
//!
//! A paper is cut into chunks by the [`Segmenter`], each chunk is sent to the
//! LLM once with a system instruction built from the [`ExtractionSchema`],
//! and the decoded per-chunk values are folded by the [`Aggregator`] into one
//! deduplicated record per paper.
//!
//! # Architecture
//!
//! ```text
//! PaperRecord → Segmenter → Chunks → LLM → PartialExtraction → Aggregator → AggregateExtraction
//! ```
//!
//! # Failure handling
//!
//! - **Undecodable responses**: recovered per chunk as an empty partial, logged
//!   with the (truncated) raw content and recorded as an [`ExtractionFailure`]
//! - **Provider errors and timeouts**: returned to the caller
//!
//! # Example Usage
//!
//! ```no_run
//! use neurotab_domain::{ExtractionSchema, PaperRecord, ProcessingMode};
//! use neurotab_extractor::{ExtractorConfig, FieldExtractor};
//! use neurotab_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"subjects": ["humans"]}"#);
//! let extractor = FieldExtractor::new(llm, ExtractionSchema::core(), ExtractorConfig::default())?;
//!
//! let paper = PaperRecord::new("PMC123").with_title("White matter in bipolar disorder");
//! let result = extractor.extract_paper(&paper, ProcessingMode::MetadataOnly).await?;
//!
//! println!("{:?}", result.aggregate.sorted("subjects"));
//! # Ok(())
//! # }
//! ```
//!
//! [`ExtractionSchema`]: neurotab_domain::ExtractionSchema

#![warn(missing_docs)]

mod aggregator;
mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;


pub use aggregator::{aggregate, Aggregator};
pub use chunking::{segment, split_sections, Segmenter, SECTION_MARKER};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::FieldExtractor;
pub use parser::{parse_llm_response, ParsedResponse};
pub use prompt::{user_payload, PromptBuilder};
pub use types::{
    ChunkExtraction, ExtractionFailure, ExtractionMetadata, MalformedValue, PaperExtraction,
};
