//! Command implementations.

pub mod extract;
pub mod init;
pub mod run;
pub mod schema;
pub mod segment;

pub use self::extract::execute_extract;
pub use self::init::execute_init;
pub use self::run::execute_run;
pub use self::schema::execute_schema;
pub use self::segment::execute_segment;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::provider::build_provider;
use neurotab_domain::PaperRecord;
use neurotab_extractor::FieldExtractor;
use neurotab_llm::LlmProvider;
use neurotab_pipeline::load_papers;

/// Load the configured corpus.
pub(crate) fn load_corpus(config: &Config) -> Result<Vec<PaperRecord>> {
    Ok(load_papers(&config.corpus.input)?)
}

/// Pick one paper by identifier, or by position (default 0).
pub(crate) fn find_paper<'a>(
    papers: &'a [PaperRecord],
    index: Option<usize>,
    pmcid: Option<&str>,
) -> Result<&'a PaperRecord> {
    if let Some(pmcid) = pmcid {
        return papers
            .iter()
            .find(|p| p.pmcid == pmcid)
            .ok_or_else(|| CliError::InvalidInput(format!("No paper with pmcid '{}'", pmcid)));
    }

    let index = index.unwrap_or(0);
    papers.get(index).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "Index {} out of range (corpus has {} papers)",
            index,
            papers.len()
        ))
    })
}

/// Build an extractor from the configured schema, provider and settings.
pub(crate) fn build_extractor(config: &Config) -> Result<FieldExtractor<Box<dyn LlmProvider>>> {
    let schema = config.schema.resolve()?;
    let llm = build_provider(&config.llm)?;
    Ok(FieldExtractor::new(llm, schema, config.extractor.clone())?)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::{Config, ProviderKind};
    use std::path::Path;

    pub const CORPUS: &str = r#"[
        {"pmcid": "PMC1", "title": "Fornix in mice", "abstract": "DTI at 9.4T.", "keywords": "DTI", "body": "Intro ## Methods FSL ## Results FA"},
        {"pmcid": "PMC2", "title": "Arcuate in humans", "abstract": NaN, "keywords": null, "body": "Single section"},
        {"pmcid": "PMC3", "title": "Review", "abstract": "", "keywords": "", "body": ""}
    ]"#;

    /// Config pointing at a corpus and output inside `dir`, mock provider, no pacing.
    pub fn config(dir: &Path, mock_response: &str) -> Config {
        let input = dir.join("papers.json");
        std::fs::write(&input, CORPUS).unwrap();

        let mut config = Config::default();
        config.llm.provider = ProviderKind::Mock;
        config.llm.mock_response = mock_response.to_string();
        config.corpus.input = input;
        config.pipeline.output = dir.join("out.csv");
        config.pipeline.delay_secs = 0.0;
        config.schema.preset = "core".to_string();
        config
    }
}
