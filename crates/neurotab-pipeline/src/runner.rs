//! Sequential batch runner

use crate::config::{BatchConfig, FailurePolicy};
use crate::error::PipelineError;
use crate::metrics::BatchMetrics;
use crate::sink::{write_rows, CsvSink};
use neurotab_domain::{ExtractionSchema, OutputRow, PaperRecord};
use neurotab_extractor::{ExtractionFailure, FieldExtractor};
use neurotab_llm::LlmProvider;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress after each paper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// Papers attempted so far (1-based)
    pub processed: usize,

    /// Papers in the batch
    pub total: usize,

    /// Identifier of the paper just attempted
    pub pmcid: &'a str,

    /// Whether it produced a row
    pub succeeded: bool,
}

type ProgressFn = Box<dyn Fn(Progress<'_>) + Send + Sync>;

/// A paper that produced no row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperFailure {
    /// Position in the batch (0-based)
    pub index: usize,

    /// Paper identifier
    pub pmcid: String,

    /// Reason for failure
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Rows in input order, one per successful paper
    pub rows: Vec<OutputRow>,

    /// Papers skipped after a failure
    pub failures: Vec<PaperFailure>,

    /// Chunks whose responses could not be decoded, per paper
    pub decode_failures: Vec<(String, ExtractionFailure)>,

    /// Counters for the run
    pub metrics: BatchMetrics,
}

/// Runs extraction over a corpus, one paper at a time
///
/// Input order is preserved. After every paper (the last one included) the
/// runner sleeps for the configured delay.
pub struct BatchRunner<L: LlmProvider> {
    extractor: FieldExtractor<L>,
    config: BatchConfig,
    progress: Option<ProgressFn>,
}

impl<L: LlmProvider> BatchRunner<L> {
    /// Create a runner. Fails if the configuration is invalid.
    pub fn new(extractor: FieldExtractor<L>, config: BatchConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            extractor,
            config,
            progress: None,
        })
    }

    /// Call `f` after every paper
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(Progress<'_>) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(f));
        self
    }

    /// The schema rows are built for
    pub fn schema(&self) -> &ExtractionSchema {
        self.extractor.schema()
    }

    /// The active configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// The underlying extractor
    pub fn extractor(&self) -> &FieldExtractor<L> {
        &self.extractor
    }

    /// Run the batch and keep every row in memory
    pub async fn run(&self, papers: &[PaperRecord]) -> Result<BatchReport, PipelineError> {
        self.process(papers, |_| Ok(())).await
    }

    /// Run the batch and write the rows to `path` as CSV
    ///
    /// With `incremental_flush` the header is written before the first paper
    /// and each row is flushed as soon as it exists. Otherwise the file is
    /// written once, after the last paper.
    pub async fn run_to_csv(
        &self,
        papers: &[PaperRecord],
        path: impl AsRef<Path>,
    ) -> Result<BatchReport, PipelineError> {
        let path = path.as_ref();

        if !self.config.incremental_flush {
            let mut report = self.run(papers).await?;
            report.metrics.rows_written = write_rows(path, &report.rows, self.schema())?;
            return Ok(report);
        }

        let mut sink = CsvSink::create(path, self.schema())?;
        let mut report = self
            .process(papers, |row| {
                sink.write_row(row)?;
                sink.flush()
            })
            .await?;
        report.metrics.rows_written = sink.finish()?;
        Ok(report)
    }

    /// Run the batch, write to the configured output path
    pub async fn run_to_configured_output(
        &self,
        papers: &[PaperRecord],
    ) -> Result<BatchReport, PipelineError> {
        self.run_to_csv(papers, &self.config.output).await
    }

    async fn process<F>(
        &self,
        papers: &[PaperRecord],
        mut on_row: F,
    ) -> Result<BatchReport, PipelineError>
    where
        F: FnMut(&OutputRow) -> Result<(), PipelineError>,
    {
        let start_time = Instant::now();
        let total = papers.len();
        let mode = self.config.mode;
        let mut report = BatchReport {
            metrics: BatchMetrics::new(total),
            ..BatchReport::default()
        };

        info!(
            papers = total,
            mode = mode.as_str(),
            model = self.extractor.model_name(),
            "Starting batch"
        );

        for (index, paper) in papers.iter().enumerate() {
            let succeeded = match self.extractor.extract_paper(paper, mode).await {
                Ok(extraction) => {
                    let row = extraction.to_row(paper);
                    on_row(&row)?;
                    report.metrics.record_paper(&extraction);
                    report.decode_failures.extend(
                        extraction
                            .failures
                            .into_iter()
                            .map(|f| (paper.pmcid.clone(), f)),
                    );
                    report.rows.push(row);
                    true
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::Extraction {
                            index,
                            pmcid: paper.pmcid.clone(),
                            source: e,
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!(index, pmcid = %paper.pmcid, error = %e, "Skipping paper");
                        report.metrics.record_failure();
                        report.failures.push(PaperFailure {
                            index,
                            pmcid: paper.pmcid.clone(),
                            reason: e.to_string(),
                        });
                        false
                    }
                },
            };

            info!("Processed {}/{}", index + 1, total);
            if let Some(progress) = &self.progress {
                progress(Progress {
                    processed: index + 1,
                    total,
                    pmcid: &paper.pmcid,
                    succeeded,
                });
            }

            self.pace().await;
        }

        report.metrics.total_runtime_ms = start_time.elapsed().as_millis() as u64;
        info!(
            processed = report.metrics.papers_processed,
            failed = report.metrics.papers_failed,
            "Batch complete"
        );
        Ok(report)
    }

    async fn pace(&self) {
        let delay = self.config.delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Pacing");
            tokio::time::sleep(delay).await;
        }
    }
}
