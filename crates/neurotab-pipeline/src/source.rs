//! Paper corpus loading

use crate::error::PipelineError;
use neurotab_domain::PaperRecord;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Load a corpus file: a JSON array of paper objects
pub fn load_papers(path: impl AsRef<Path>) -> Result<Vec<PaperRecord>, PipelineError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let papers = parse_papers(&raw)?;
    info!(path = %path.display(), papers = papers.len(), "Loaded corpus");
    Ok(papers)
}

/// Parse a corpus from a JSON string
///
/// Bare `NaN`, `Infinity` and `-Infinity` tokens (written by pandas for
/// missing cells) are read as `null`, so the field becomes empty text.
pub fn parse_papers(json: &str) -> Result<Vec<PaperRecord>, PipelineError> {
    let cleaned = sanitize_non_finite(json);
    if let Cow::Owned(_) = cleaned {
        debug!("Replaced non-finite number literals with null");
    }
    Ok(serde_json::from_str(&cleaned)?)
}

/// Select `limit` papers starting at `offset`, clamped to the corpus
pub fn select(papers: &[PaperRecord], offset: usize, limit: Option<usize>) -> &[PaperRecord] {
    let start = offset.min(papers.len());
    let end = match limit {
        Some(limit) => start.saturating_add(limit).min(papers.len()),
        None => papers.len(),
    };
    &papers[start..end]
}

const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace non-finite literals outside of strings with `null`
fn sanitize_non_finite(json: &str) -> Cow<'_, str> {
    if !NON_FINITE.iter().any(|token| json.contains(token)) {
        return Cow::Borrowed(json);
    }

    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}
