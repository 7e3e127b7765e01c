//! Processing mode - how a paper is cut into chunks

use serde::{Deserialize, Serialize};

/// Selects how a paper is turned into extraction chunks
///
/// - NoChunk: one chunk holding title, abstract, keywords and body
/// - Chunk: a lead chunk (title, abstract, keywords) followed by one chunk per body section
/// - MetadataOnly: one chunk holding title, abstract and keywords; the body is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    /// Whole paper in a single chunk
    #[default]
    NoChunk,

    /// Lead chunk followed by body sections
    Chunk,

    /// Title, abstract and keywords only
    MetadataOnly,
}

impl ProcessingMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::NoChunk => "no-chunk",
            ProcessingMode::Chunk => "chunk",
            ProcessingMode::MetadataOnly => "metadata-only",
        }
    }

    /// Parse a mode from its name or its legacy numeric code (1, 2, 3)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "no-chunk" | "nochunk" | "no_chunk" | "1" => Some(ProcessingMode::NoChunk),
            "chunk" | "chunked" | "2" => Some(ProcessingMode::Chunk),
            "metadata-only" | "metadata" | "metadata_only" | "3" => {
                Some(ProcessingMode::MetadataOnly)
            }
            _ => None,
        }
    }

    /// Whether the body text takes part in extraction
    pub fn uses_body(&self) -> bool {
        !matches!(self, ProcessingMode::MetadataOnly)
    }
}

impl std::str::FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid processing mode: {}", s))
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
