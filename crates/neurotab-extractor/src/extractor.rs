//! Core FieldExtractor implementation

use crate::aggregator::Aggregator;
use crate::chunking::Segmenter;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_llm_response, truncate_chars};
use crate::prompt::{user_payload, PromptBuilder};
use crate::types::{ChunkExtraction, ExtractionFailure, ExtractionMetadata, PaperExtraction};
use neurotab_domain::{Chunk, ExtractionSchema, PaperRecord, PartialExtraction, ProcessingMode};
use neurotab_llm::{CompletionRequest, LlmProvider};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns chunks of paper text into schema field values, one LLM call per chunk
pub struct FieldExtractor<L: LlmProvider> {
    llm: L,
    schema: ExtractionSchema,
    config: ExtractorConfig,
    system_prompt: String,
}

impl<L: LlmProvider> FieldExtractor<L> {
    /// Create a new extractor. Fails if the schema or configuration is invalid.
    pub fn new(
        llm: L,
        schema: ExtractionSchema,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        schema.validate()?;
        config.validate().map_err(ExtractorError::Config)?;
        let system_prompt = PromptBuilder::new(&schema).build();

        Ok(Self {
            llm,
            schema,
            config,
            system_prompt,
        })
    }

    /// The schema values are extracted for
    pub fn schema(&self) -> &ExtractionSchema {
        &self.schema
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The system instruction sent with every chunk
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Model identifier reported by the provider
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Extract one chunk with exactly one LLM call
    ///
    /// An undecodable response yields an empty partial plus a recorded failure.
    /// Provider errors and timeouts are returned as errors.
    pub async fn extract_chunk(&self, chunk: &Chunk) -> Result<ChunkExtraction, ExtractorError> {
        let request = CompletionRequest::new(self.system_prompt.as_str(), user_payload(&chunk.text));

        debug!(
            chunk = chunk.index,
            kind = chunk.kind.as_str(),
            chars = chunk.char_len(),
            "Sending chunk to LLM"
        );

        let response = timeout(self.config.extraction_timeout(), self.llm.complete(&request))
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))??;

        debug!(chunk = chunk.index, chars = response.len(), "LLM response received");

        match parse_llm_response(&response, &self.schema, self.config.lenient_json) {
            Ok(parsed) => {
                for malformed in &parsed.malformed {
                    warn!(
                        chunk = chunk.index,
                        field = %malformed.field,
                        reason = %malformed.reason,
                        "Skipping malformed field value"
                    );
                }
                Ok(ChunkExtraction {
                    chunk_index: chunk.index,
                    kind: chunk.kind,
                    partial: parsed.extraction,
                    failure: None,
                    malformed: parsed.malformed,
                })
            }
            Err(e) => {
                let raw = truncate_chars(&response, self.config.raw_log_limit);
                warn!(chunk = chunk.index, error = %e, raw = %raw, "Undecodable LLM response");
                Ok(ChunkExtraction {
                    chunk_index: chunk.index,
                    kind: chunk.kind,
                    partial: PartialExtraction::empty(),
                    failure: Some(ExtractionFailure {
                        chunk_index: chunk.index,
                        reason: e.to_string(),
                        raw_response: raw,
                    }),
                    malformed: Vec::new(),
                })
            }
        }
    }

    /// Segment a paper, extract every chunk in order, and aggregate
    pub async fn extract_paper(
        &self,
        paper: &PaperRecord,
        mode: ProcessingMode,
    ) -> Result<PaperExtraction, ExtractorError> {
        let start_time = Instant::now();
        let chunks = Segmenter::new(mode).segment(paper);

        debug!(pmcid = %paper.pmcid, mode = mode.as_str(), chunks = chunks.len(), "Segmented paper");

        let mut aggregator = Aggregator::new(&self.schema);
        let mut failures = Vec::new();
        let mut malformed = Vec::new();
        let mut chunks_decoded = 0;

        for chunk in &chunks {
            let result = self.extract_chunk(chunk).await?;
            aggregator.fold(&result.partial);
            if result.is_decoded() {
                chunks_decoded += 1;
            }
            failures.extend(result.failure);
            malformed.extend(result.malformed);
        }

        let aggregate = aggregator.finish();
        let metadata = ExtractionMetadata {
            model_name: self.llm.model_name().to_string(),
            mode,
            chunks: chunks.len(),
            chunks_decoded,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            pmcid = %paper.pmcid,
            chunks = metadata.chunks,
            failed = failures.len(),
            values = aggregate.value_count(),
            "Paper extracted"
        );

        Ok(PaperExtraction {
            pmcid: paper.pmcid.clone(),
            aggregate,
            failures,
            malformed,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurotab_domain::{ChunkKind, SchemaField};
    use neurotab_llm::MockProvider;

    fn schema() -> ExtractionSchema {
        ExtractionSchema::new(vec![
            SchemaField::new("subjects", ["humans"]),
            SchemaField::new("template_space", ["MNI"]),
        ])
    }

    fn create_test_extractor(llm: MockProvider) -> FieldExtractor<MockProvider> {
        FieldExtractor::new(llm, schema(), ExtractorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_extract_chunk_makes_one_call() {
        let llm = MockProvider::new(r#"{"subjects": ["humans"]}"#);
        let extractor = create_test_extractor(llm.clone());

        let result = extractor
            .extract_chunk(&Chunk::new(0, ChunkKind::Lead, "A DTI study"))
            .await
            .unwrap();

        assert!(result.is_decoded());
        assert_eq!(result.partial.get("subjects"), &["humans"]);
        assert_eq!(llm.call_count(), 1);

        let request = &llm.requests()[0];
        assert_eq!(request.user, r#"{"body":"A DTI study"}"#);
        assert_eq!(request.system, extractor.system_prompt());
        assert!(request.deterministic);
    }

    #[tokio::test]
    async fn test_sampling_is_always_deterministic() {
        let from_file = ExtractorConfig::from_toml("deterministic = false\n").unwrap();
        let configs = [
            from_file,
            ExtractorConfig::strict(),
            ExtractorConfig::lenient(),
        ];

        for config in configs {
            let llm = MockProvider::new("{}");
            let extractor = FieldExtractor::new(llm.clone(), schema(), config).unwrap();
            extractor
                .extract_chunk(&Chunk::new(0, ChunkKind::Full, "text"))
                .await
                .unwrap();

            assert_eq!(llm.requests()[0].temperature(), Some(0.0));
        }
    }

    #[tokio::test]
    async fn test_extract_chunk_recovers_from_bad_json() {
        let extractor = create_test_extractor(MockProvider::new("not json at all"));

        let result = extractor
            .extract_chunk(&Chunk::new(2, ChunkKind::Section, "text"))
            .await
            .unwrap();

        assert!(result.partial.is_empty());
        let failure = result.failure.unwrap();
        assert_eq!(failure.chunk_index, 2);
        assert_eq!(failure.raw_response, "not json at all");
    }

    #[tokio::test]
    async fn test_extract_chunk_propagates_llm_error() {
        let mut llm = MockProvider::default();
        llm.add_error("boom");
        let extractor = create_test_extractor(llm);

        let result = extractor
            .extract_chunk(&Chunk::new(0, ChunkKind::Full, "boom"))
            .await;
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let result = FieldExtractor::new(
            MockProvider::default(),
            ExtractionSchema::new(vec![]),
            ExtractorConfig::default(),
        );
        assert!(matches!(result, Err(ExtractorError::Schema(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ExtractorConfig::default();
        config.raw_log_limit = 0;
        let result = FieldExtractor::new(MockProvider::default(), schema(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
