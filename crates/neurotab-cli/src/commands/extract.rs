//! Extract command implementation.

use super::{build_extractor, find_paper, load_corpus};
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use neurotab_extractor::PaperExtraction;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    args.corpus.apply(config);
    args.llm.apply(config);
    config.validate()?;

    let extraction = extract_one(config, args.index, args.pmcid.as_deref()).await?;
    println!("{}", formatter.format_extraction(&extraction)?);

    Ok(())
}

/// Extract a single paper without writing any output file.
pub async fn extract_one(
    config: &Config,
    index: Option<usize>,
    pmcid: Option<&str>,
) -> Result<PaperExtraction> {
    let papers = load_corpus(config)?;
    let paper = find_paper(&papers, index, pmcid)?;
    let extractor = build_extractor(config)?;
    Ok(extractor.extract_paper(paper, config.pipeline.mode).await?)
}
