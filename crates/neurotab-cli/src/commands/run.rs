//! Run command implementation.

use super::{build_extractor, load_corpus};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use indicatif::{ProgressBar, ProgressStyle};
use neurotab_pipeline::{select, BatchReport, BatchRunner};
use tracing::warn;

/// Execute the run command.
pub async fn execute_run(
    args: RunArgs,
    config: &mut Config,
    formatter: &Formatter,
    show_progress: bool,
) -> Result<()> {
    args.apply(config);
    config.validate()?;

    let report = run_batch(config, show_progress).await?;
    let destination = config.pipeline.output.display().to_string();
    println!("{}", formatter.format_report(&report, &destination)?);

    Ok(())
}

/// Extract the selected slice of the corpus and write the CSV table.
pub async fn run_batch(config: &Config, show_progress: bool) -> Result<BatchReport> {
    let papers = load_corpus(config)?;
    let selected = select(&papers, config.corpus.offset, config.corpus.limit);
    if selected.is_empty() {
        warn!(
            corpus = papers.len(),
            offset = config.corpus.offset,
            "No papers selected, writing header only"
        );
    }

    let extractor = build_extractor(config)?;
    let bar = progress_bar(selected.len(), show_progress);
    let ticker = bar.clone();
    let runner = BatchRunner::new(extractor, config.pipeline.clone())?.with_progress(move |p| {
        ticker.set_position(p.processed as u64);
        ticker.set_message(p.pmcid.to_string());
    });

    let result = runner.run_to_configured_output(selected).await;
    bar.finish_and_clear();
    Ok(result?)
}

fn progress_bar(total: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use neurotab_domain::ProcessingMode;
    use neurotab_pipeline::FailurePolicy;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_writes_csv() {
        let dir = TempDir::new().unwrap();
        let config = testing::config(dir.path(), r#"{"subjects": ["mice"]}"#);

        let report = run_batch(&config, false).await.unwrap();
        assert_eq!(report.metrics.rows_written, 3);

        let content = std::fs::read_to_string(&config.pipeline.output).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "pmcid,title,imaging_modalities,patient_groups,whitematter_tracts,subjects"
        );
        assert_eq!(lines[2], "PMC2,Arcuate in humans,,,,mice");
    }

    #[tokio::test]
    async fn test_run_respects_offset_and_limit() {
        let dir = TempDir::new().unwrap();
        let mut config = testing::config(dir.path(), "{}");
        config.corpus.offset = 1;
        config.corpus.limit = Some(1);
        config.pipeline.mode = ProcessingMode::Chunk;

        let report = run_batch(&config, false).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].pmcid, "PMC2");
        assert_eq!(report.metrics.chunks, 2);
    }

    #[tokio::test]
    async fn test_run_offset_past_end_writes_header() {
        let dir = TempDir::new().unwrap();
        let mut config = testing::config(dir.path(), "{}");
        config.corpus.offset = 10;

        let report = run_batch(&config, false).await.unwrap();
        assert_eq!(report.metrics.rows_written, 0);
        let content = std::fs::read_to_string(&config.pipeline.output).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_run_undecodable_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = testing::config(dir.path(), "not json");
        config.pipeline.failure_policy = FailurePolicy::Abort;

        let report = run_batch(&config, false).await.unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.metrics.decode_failures, 3);
    }
}
