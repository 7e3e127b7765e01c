//! Paper segmentation into extraction chunks

use neurotab_domain::{Chunk, ChunkKind, PaperRecord, ProcessingMode};

/// Two-character marker that opens a top-level body section
pub const SECTION_MARKER: &str = "##";

/// Cuts papers into chunks according to a processing mode
///
/// Segmentation is pure: the same paper and mode always produce the same
/// chunk sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    mode: ProcessingMode,
}

impl Segmenter {
    /// Create a segmenter for the given mode
    pub fn new(mode: ProcessingMode) -> Self {
        Self { mode }
    }

    /// The processing mode in use
    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Segment one paper
    pub fn segment(&self, paper: &PaperRecord) -> Vec<Chunk> {
        match self.mode {
            ProcessingMode::NoChunk => vec![Chunk::new(0, ChunkKind::Full, paper.full_text())],
            ProcessingMode::MetadataOnly => {
                vec![Chunk::new(0, ChunkKind::Lead, paper.lead_text())]
            }
            ProcessingMode::Chunk => {
                let mut chunks = vec![Chunk::new(0, ChunkKind::Lead, paper.lead_text())];
                chunks.extend(
                    split_sections(&paper.body)
                        .into_iter()
                        .enumerate()
                        .map(|(idx, text)| Chunk::new(idx + 1, ChunkKind::Section, text)),
                );
                chunks
            }
        }
    }
}

/// Segment a paper with a one-off [`Segmenter`]
pub fn segment(paper: &PaperRecord, mode: ProcessingMode) -> Vec<Chunk> {
    Segmenter::new(mode).segment(paper)
}

/// Split a body into top-level sections
///
/// Fragments between `##` markers are trimmed and empty ones dropped. A
/// fragment starting with `#` is a deeper heading: it is folded into the
/// section in progress with its `##` restored, so `### Sub` stays intact.
pub fn split_sections(body: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for (idx, raw) in body.split(SECTION_MARKER).enumerate() {
        let fragment = raw.trim();
        if fragment.is_empty() {
            continue;
        }

        if fragment.starts_with('#') {
            current.push(' ');
            // the leading fragment was never preceded by a marker
            if idx > 0 {
                current.push_str(SECTION_MARKER);
            }
            current.push_str(fragment);
        } else {
            flush_section(&mut sections, &mut current);
            current.push_str(fragment);
        }
    }

    flush_section(&mut sections, &mut current);
    sections
}

fn flush_section(sections: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
    current.clear();
}
