//! Decode LLM output into per-field values

use crate::error::ExtractorError;
use crate::types::MalformedValue;
use neurotab_domain::{ExtractionSchema, PartialExtraction};
use serde_json::Value;
use tracing::debug;

/// A decoded response
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
    /// Values for schema fields
    pub extraction: PartialExtraction,

    /// Values present under a schema field but not usable
    pub malformed: Vec<MalformedValue>,

    /// Top-level keys that are not schema fields
    pub ignored_keys: Vec<String>,
}

/// Decode one LLM response against the schema
///
/// The top level must be a JSON object. For each schema field an array keeps
/// its non-empty string elements, a non-empty string becomes one value, and
/// `null`, absent or empty values contribute nothing. With `lenient` a
/// surrounding markdown code fence is stripped first.
pub fn parse_llm_response(
    response: &str,
    schema: &ExtractionSchema,
    lenient: bool,
) -> Result<ParsedResponse, ExtractorError> {
    let json_str = if lenient {
        strip_code_fence(response)
    } else {
        response
    };

    let json: Value = serde_json::from_str(json_str)?;
    let object = json.as_object().ok_or_else(|| {
        ExtractorError::InvalidFormat(format!("expected JSON object, got {}", kind_of(&json)))
    })?;

    let mut parsed = ParsedResponse::default();

    for field in schema.field_names() {
        match object.get(field) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => {
                if !s.is_empty() {
                    parsed.extraction.push(field, s.as_str());
                }
            }
            Some(Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) if !s.is_empty() => {
                            parsed.extraction.push(field, s.as_str())
                        }
                        Value::String(_) => {}
                        other => parsed.malformed.push(MalformedValue {
                            field: field.to_string(),
                            reason: format!("element {} is {}, not a string", idx, kind_of(other)),
                        }),
                    }
                }
            }
            Some(other) => parsed.malformed.push(MalformedValue {
                field: field.to_string(),
                reason: format!("expected array or string, got {}", kind_of(other)),
            }),
        }
    }

    parsed.ignored_keys = object
        .keys()
        .filter(|key| !schema.contains(key))
        .cloned()
        .collect();
    if !parsed.ignored_keys.is_empty() {
        debug!(keys = ?parsed.ignored_keys, "Ignoring keys outside the schema");
    }

    Ok(parsed)
}

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence, if any
pub(crate) fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // drop the info string (e.g. "json") on the opening line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Keep at most `limit` characters, marking the cut
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
