//! Metrics collection for batch runs

use neurotab_extractor::PaperExtraction;

/// Counters collected while a batch runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMetrics {
    /// Papers in the batch
    pub papers_total: usize,

    /// Papers that produced a row
    pub papers_processed: usize,

    /// Papers whose extraction failed
    pub papers_failed: usize,

    /// Chunks sent to the LLM
    pub chunks: usize,

    /// Chunks whose response could not be decoded
    pub decode_failures: usize,

    /// Field values skipped as malformed
    pub malformed_values: usize,

    /// Distinct values across all rows
    pub values_extracted: usize,

    /// Rows written to a CSV file (0 for in-memory runs)
    pub rows_written: usize,

    /// Wall-clock runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl BatchMetrics {
    /// Create new empty metrics for a batch of `papers_total`
    pub fn new(papers_total: usize) -> Self {
        Self {
            papers_total,
            ..Self::default()
        }
    }

    /// Record a successfully extracted paper
    pub fn record_paper(&mut self, extraction: &PaperExtraction) {
        self.papers_processed += 1;
        self.chunks += extraction.metadata.chunks;
        self.decode_failures += extraction.failures.len();
        self.malformed_values += extraction.malformed.len();
        self.values_extracted += extraction.aggregate.value_count();
    }

    /// Record a failed paper
    pub fn record_failure(&mut self) {
        self.papers_failed += 1;
    }

    /// Papers attempted so far
    pub fn papers_attempted(&self) -> usize {
        self.papers_processed + self.papers_failed
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Metrics Summary".to_string(),
            "=====================".to_string(),
            format!(
                "Papers: {}/{} processed, {} failed",
                self.papers_processed, self.papers_total, self.papers_failed
            ),
            format!("Chunks: {}", self.chunks),
            format!("Values extracted: {}", self.values_extracted),
            format!("Rows written: {}", self.rows_written),
        ];

        if self.decode_failures > 0 || self.malformed_values > 0 {
            lines.push(format!("Undecodable responses: {}", self.decode_failures));
            lines.push(format!("Malformed values skipped: {}", self.malformed_values));
        }

        lines.push(format!(
            "Total runtime: {:.1}s",
            self.total_runtime_ms as f64 / 1000.0
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = BatchMetrics::new(3);
        assert_eq!(metrics.papers_total, 3);
        assert_eq!(metrics.papers_attempted(), 0);
        assert_eq!(metrics.rows_written, 0);
    }

    #[test]
    fn test_record_failure() {
        let mut metrics = BatchMetrics::new(2);
        metrics.record_failure();

        assert_eq!(metrics.papers_failed, 1);
        assert_eq!(metrics.papers_processed, 0);
        assert_eq!(metrics.papers_attempted(), 1);
    }

    #[test]
    fn test_summary() {
        let mut metrics = BatchMetrics::new(4);
        metrics.papers_processed = 3;
        metrics.papers_failed = 1;
        metrics.decode_failures = 2;
        metrics.total_runtime_ms = 1500;

        let summary = metrics.summary();
        assert!(summary.contains("Papers: 3/4 processed, 1 failed"));
        assert!(summary.contains("Undecodable responses: 2"));
        assert!(summary.contains("Total runtime: 1.5s"));
    }

    #[test]
    fn test_summary_hides_clean_counters() {
        let summary = BatchMetrics::new(1).summary();
        assert!(!summary.contains("Undecodable"));
    }
}
