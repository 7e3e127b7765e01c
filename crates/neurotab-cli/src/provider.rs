//! LLM provider construction from configuration.

use crate::config::{LlmSettings, ProviderKind};
use crate::error::Result;
use neurotab_llm::{LlmProvider, MockProvider, OllamaProvider, OpenAiProvider};
use tracing::debug;

/// Build the configured provider.
///
/// The OpenAI key is read from `api_key_env`; call `dotenvy::dotenv()` first
/// if it lives in a `.env` file.
pub fn build_provider(settings: &LlmSettings) -> Result<Box<dyn LlmProvider>> {
    debug!(
        provider = settings.provider.as_str(),
        model = %settings.model,
        "Building LLM provider"
    );

    let provider: Box<dyn LlmProvider> = match settings.provider {
        ProviderKind::OpenAi => {
            let mut provider = OpenAiProvider::from_env(&settings.api_key_env, &settings.model)?
                .with_max_attempts(settings.max_attempts);
            if let Some(endpoint) = &settings.endpoint {
                provider = provider.with_base_url(endpoint);
            }
            if let Some(timeout) = settings.timeout_secs {
                provider = provider.with_timeout(timeout);
            }
            Box::new(provider)
        }
        ProviderKind::Ollama => {
            let mut provider = match &settings.endpoint {
                Some(endpoint) => OllamaProvider::new(endpoint, &settings.model),
                None => OllamaProvider::default_endpoint(&settings.model),
            }
            .with_max_attempts(settings.max_attempts);
            if let Some(timeout) = settings.timeout_secs {
                provider = provider.with_timeout(timeout);
            }
            Box::new(provider)
        }
        ProviderKind::Mock => Box::new(MockProvider::new(settings.mock_response.clone())),
    };

    Ok(provider)
}
