//! Chunk module - units of text sent to the extractor

use serde::{Deserialize, Serialize};

/// Where a chunk's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// Title, abstract, keywords and body in one piece
    Full,

    /// Title, abstract and keywords
    Lead,

    /// One top-level body section with its nested subsections
    Section,
}

impl ChunkKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Full => "full",
            ChunkKind::Lead => "lead",
            ChunkKind::Section => "section",
        }
    }
}

/// A single unit of paper text submitted for one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position within the paper's chunk sequence (0-based)
    pub index: usize,

    /// Origin of the text
    pub kind: ChunkKind,

    /// Text sent to the LLM
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: usize, kind: ChunkKind, text: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            text: text.into(),
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
