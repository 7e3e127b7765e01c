//! LLM prompt construction from an extraction schema

use neurotab_domain::ExtractionSchema;
use serde_json::{json, Value};

const DEFAULT_PREAMBLE: &str = "You are an information extraction expert for scientific papers.";

const TASK_LINE: &str = "Task: Given a JSON object that contains paper text in its \"body\" field, \
extract and return a JSON object with these fields:";

/// Number of example values per field shown in the example output object
const EXAMPLE_OUTPUT_VALUES: usize = 2;

/// Builds the system instruction for a schema
pub struct PromptBuilder<'a> {
    schema: &'a ExtractionSchema,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(schema: &'a ExtractionSchema) -> Self {
        Self { schema }
    }

    /// Build the complete system instruction
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role
        prompt.push_str(self.schema.preamble.as_deref().unwrap_or(DEFAULT_PREAMBLE));
        prompt.push_str("\n\n");

        // 2. Fields with example values
        prompt.push_str(TASK_LINE);
        prompt.push_str("\n\n");
        for field in &self.schema.fields {
            prompt.push_str(&format!(
                "- {}: e.g {}\n",
                field.name,
                Value::from(field.examples.clone())
            ));
        }

        // 3. Field rules, then general rules
        let rules: Vec<&str> = self
            .schema
            .fields
            .iter()
            .filter_map(|f| f.rule.as_deref())
            .chain(self.schema.rules.iter().map(String::as_str))
            .collect();
        if !rules.is_empty() {
            prompt.push_str("\nRules:\n");
            for rule in rules {
                prompt.push_str(&format!("- {}\n", rule));
            }
        }

        // 4. Output shape
        prompt.push_str("\nExample output format:\n");
        prompt.push_str(&self.example_output());
        prompt.push('\n');

        prompt
    }

    /// JSON object with every field and up to two of its examples, in schema order
    fn example_output(&self) -> String {
        let lines: Vec<String> = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let sample: Vec<&String> =
                    field.examples.iter().take(EXAMPLE_OUTPUT_VALUES).collect();
                format!("  {}: {}", Value::from(field.name.as_str()), json!(sample))
            })
            .collect();
        format!("{{\n{}\n}}", lines.join(",\n"))
    }
}

/// User message for one chunk: `{"body": <text>}`, non-ASCII left unescaped
pub fn user_payload(text: &str) -> String {
    json!({ "body": text }).to_string()
}
