//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use neurotab_domain::{Chunk, ExtractionSchema};
use neurotab_extractor::PaperExtraction;
use neurotab_pipeline::{BatchReport, PaperFailure};
use serde_json::{json, Map, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Characters of chunk text shown in the segment table.
const PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the values extracted from one paper.
    pub fn format_extraction(&self, extraction: &PaperExtraction) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_extraction_json(extraction),
            OutputFormat::Table => Ok(self.format_extraction_table(extraction)),
        }
    }

    fn format_extraction_json(&self, extraction: &PaperExtraction) -> Result<String> {
        let mut fields = Map::new();
        for name in extraction.aggregate.fields() {
            fields.insert(name.clone(), json!(extraction.aggregate.sorted(name)));
        }

        let value = json!({
            "pmcid": extraction.pmcid,
            "fields": Value::Object(fields),
            "failures": extraction.failures,
            "malformed": extraction.malformed,
            "metadata": extraction.metadata,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_extraction_table(&self, extraction: &PaperExtraction) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Values"]);
        for name in extraction.aggregate.fields() {
            builder.push_record([name.clone(), extraction.aggregate.sorted(name).join("; ")]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let meta = &extraction.metadata;
        let mut out = format!(
            "{}\n{}\n",
            self.colorize(&extraction.pmcid, "cyan"),
            table
        );
        out.push_str(&format!(
            "{} chunk(s), {} decoded, {} ms ({}, {})",
            meta.chunks,
            meta.chunks_decoded,
            meta.processing_time_ms,
            meta.model_name,
            meta.mode
        ));
        for failure in &extraction.failures {
            out.push('\n');
            out.push_str(&self.warning(&format!(
                "chunk {}: {}",
                failure.chunk_index, failure.reason
            )));
        }
        out
    }

    /// Format the chunks of a segmented paper.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Table => Ok(self.format_chunks_table(chunks)),
        }
    }

    fn format_chunks_table(&self, chunks: &[Chunk]) -> String {
        if chunks.is_empty() {
            return self.colorize("No chunks.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Kind", "Chars", "Text"]);
        for chunk in chunks {
            builder.push_record([
                chunk.index.to_string(),
                chunk.kind.as_str().to_string(),
                chunk.char_len().to_string(),
                preview(&chunk.text, PREVIEW_CHARS),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a schema's fields, examples and rules.
    pub fn format_schema(&self, schema: &ExtractionSchema) -> Result<String> {
        if let OutputFormat::Json = self.format {
            return Ok(serde_json::to_string_pretty(schema)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Examples", "Rule"]);
        for field in &schema.fields {
            builder.push_record([
                field.name.clone(),
                field.examples.join(", "),
                field.rule.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        Ok(table.to_string())
    }

    /// Format papers that produced no row.
    pub fn format_failures(&self, failures: &[PaperFailure]) -> String {
        failures
            .iter()
            .map(|f| self.warning(&format!("#{} {}: {}", f.index, f.pmcid, f.reason)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format the outcome of a batch run.
    pub fn format_report(&self, report: &BatchReport, destination: &str) -> Result<String> {
        if let OutputFormat::Json = self.format {
            let metrics = &report.metrics;
            let value = json!({
                "output": destination,
                "rows_written": metrics.rows_written,
                "papers_total": metrics.papers_total,
                "papers_processed": metrics.papers_processed,
                "papers_failed": metrics.papers_failed,
                "chunks": metrics.chunks,
                "decode_failures": metrics.decode_failures,
                "malformed_values": metrics.malformed_values,
                "total_runtime_ms": metrics.total_runtime_ms,
                "failures": report.failures,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut out = self.success(&format!(
            "Saved {} records to {}",
            report.metrics.rows_written, destination
        ));
        out.push('\n');
        out.push_str(&report.metrics.summary());
        if !report.failures.is_empty() {
            out.push('\n');
            out.push_str(&self.format_failures(&report.failures));
        }
        Ok(out)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First `limit` characters of `text` on one line.
fn preview(text: &str, limit: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push('…');
    cut
}
