//! Error types for batch runs

use neurotab_extractor::ExtractorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, running or writing a batch
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File could not be read or written
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Paper corpus is not a JSON array of records
    #[error("Invalid corpus JSON: {0}")]
    Json(String),

    /// A paper could not be extracted and the failure policy is `abort`
    #[error("Extraction failed for paper {index} ({pmcid}): {source}")]
    Extraction {
        /// Position of the paper in the batch (0-based)
        index: usize,
        /// Paper identifier
        pmcid: String,
        /// Underlying error
        #[source]
        source: ExtractorError,
    },

    /// Extractor could not be set up
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Row width does not match the header
    #[error("Row has {got} cells, header has {expected}")]
    RowWidth {
        /// Header column count
        expected: usize,
        /// Cells in the offending row
        got: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Json(e.to_string())
    }
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
