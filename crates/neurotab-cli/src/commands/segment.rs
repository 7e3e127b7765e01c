//! Segment command implementation.

use super::{find_paper, load_corpus};
use crate::cli::SegmentArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use neurotab_domain::Chunk;
use neurotab_extractor::segment;

/// Execute the segment command.
pub fn execute_segment(args: SegmentArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    args.corpus.apply(config);

    let chunks = segment_one(config, args.index, args.pmcid.as_deref())?;
    println!("{}", formatter.format_chunks(&chunks)?);

    Ok(())
}

/// Cut one paper into chunks with the configured mode.
pub fn segment_one(config: &Config, index: Option<usize>, pmcid: Option<&str>) -> Result<Vec<Chunk>> {
    let papers = load_corpus(config)?;
    let paper = find_paper(&papers, index, pmcid)?;
    Ok(segment(paper, config.pipeline.mode))
}
