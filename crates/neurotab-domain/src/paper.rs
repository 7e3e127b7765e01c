//! Paper module - the input record for one article

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One paper from the preprocessed corpus
///
/// Produced by the upstream ETL stage as a JSON object with the keys
/// `pmcid`, `title`, `keywords`, `abstract` and `body`. Any of them may be
/// missing or `null` in the source data; they are normalized to empty strings
/// on load so that downstream concatenation only ever sees text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// PubMed Central identifier (opaque)
    #[serde(default, deserialize_with = "lenient_text")]
    pub pmcid: String,

    /// Article title
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    /// Article abstract
    #[serde(rename = "abstract", default, deserialize_with = "lenient_text")]
    pub abstract_text: String,

    /// Author keywords
    #[serde(default, deserialize_with = "lenient_text")]
    pub keywords: String,

    /// Full body text with markdown-style `##` section headings
    #[serde(default, deserialize_with = "lenient_text")]
    pub body: String,
}

impl PaperRecord {
    /// Create an empty record with the given identifier
    pub fn new(pmcid: impl Into<String>) -> Self {
        Self {
            pmcid: pmcid.into(),
            ..Self::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the abstract
    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    /// Set the keywords
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Title, abstract and keywords joined by single spaces
    pub fn lead_text(&self) -> String {
        [
            self.title.as_str(),
            self.abstract_text.as_str(),
            self.keywords.as_str(),
        ]
        .join(" ")
    }

    /// Title, abstract, keywords and body joined by single spaces
    pub fn full_text(&self) -> String {
        [
            self.title.as_str(),
            self.abstract_text.as_str(),
            self.keywords.as_str(),
            self.body.as_str(),
        ]
        .join(" ")
    }
}

/// Coerce any JSON scalar into text.
///
/// `null` and missing become `""`; numbers and booleans keep their textual form
/// (the ETL writes numeric PMC ids); arrays and objects are not text and become `""`.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => String::new(),
    })
}
