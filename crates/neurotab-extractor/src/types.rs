//! Result types for chunk and paper extraction

use neurotab_domain::{
    AggregateExtraction, ChunkKind, OutputRow, PaperRecord, PartialExtraction, ProcessingMode,
};
use serde::Serialize;

/// A schema field value that was present but unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedValue {
    /// Schema field the value was found under
    pub field: String,

    /// What was wrong with it
    pub reason: String,
}

/// A chunk whose LLM response could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    /// Chunk position within the paper
    pub chunk_index: usize,

    /// Reason for failure
    pub reason: String,

    /// Raw response content, truncated
    pub raw_response: String,
}

/// What one chunk yielded
#[derive(Debug, Clone)]
pub struct ChunkExtraction {
    /// Chunk position within the paper
    pub chunk_index: usize,

    /// Origin of the chunk text
    pub kind: ChunkKind,

    /// Decoded values (empty when the response was undecodable)
    pub partial: PartialExtraction,

    /// Set when the response could not be decoded
    pub failure: Option<ExtractionFailure>,

    /// Field values that were skipped
    pub malformed: Vec<MalformedValue>,
}

impl ChunkExtraction {
    /// Whether the response decoded
    pub fn is_decoded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Metadata about one paper's extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Name of the LLM model used
    pub model_name: String,

    /// Processing mode used to segment the paper
    pub mode: ProcessingMode,

    /// Number of chunks (and LLM calls)
    pub chunks: usize,

    /// Chunks whose response decoded
    pub chunks_decoded: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Result of extracting one paper
#[derive(Debug, Clone)]
pub struct PaperExtraction {
    /// Paper identifier
    pub pmcid: String,

    /// Deduplicated values over every chunk
    pub aggregate: AggregateExtraction,

    /// Chunks whose response could not be decoded
    pub failures: Vec<ExtractionFailure>,

    /// Skipped field values across all chunks
    pub malformed: Vec<MalformedValue>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl PaperExtraction {
    /// Flatten into an output row for `paper`
    pub fn to_row(&self, paper: &PaperRecord) -> OutputRow {
        OutputRow::from_aggregate(paper, &self.aggregate)
    }
}
