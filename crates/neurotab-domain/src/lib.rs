//! neurotab Domain Layer
//!
//! Core data model for turning neuroscience papers into tabular extraction records.
//! Everything here is plain data plus the invariants that go with it; the LLM,
//! file formats and the batch loop live in other crates.
//!
//! ## Key Concepts
//!
//! - **PaperRecord**: One input paper. Every text field is a string, never absent
//! - **Chunk**: One unit of paper text submitted for a single extraction call
//! - **ProcessingMode**: How a paper is cut into chunks
//! - **ExtractionSchema**: The ordered list of categorical fields to extract
//! - **PartialExtraction**: What one chunk yielded
//! - **AggregateExtraction**: The deduplicated union over all chunks of one paper
//! - **OutputRow**: The flattened, `;`-joined record written to CSV
//!
//! ## Ordering
//!
//! Aggregated field values are sets. The order in which members are rendered
//! into an [`OutputRow`] is unspecified and may differ between runs; only the
//! content is stable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod extraction;
pub mod mode;
pub mod paper;
pub mod row;
pub mod schema;

// Re-exports for convenience
pub use chunk::{Chunk, ChunkKind};
pub use extraction::{AggregateExtraction, PartialExtraction};
pub use mode::ProcessingMode;
pub use paper::PaperRecord;
pub use row::{OutputRow, MULTI_VALUE_DELIMITER};
pub use schema::{ExtractionSchema, SchemaError, SchemaField};
