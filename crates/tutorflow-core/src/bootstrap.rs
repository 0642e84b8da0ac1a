//! Wiring configuration into a ready-to-run [`Orchestrator`].

use std::sync::Arc;

use tracing::info;

use tutorflow_llm::{LlmProviderConfig, OpenAiCompatProvider, Provider};
use tutorflow_types::config::{Config, ProviderSettings};

use crate::orchestrator::Orchestrator;
use crate::stage::ProviderStageClient;

/// Translate provider settings into the transport's config.
pub fn provider_config(settings: &ProviderSettings) -> LlmProviderConfig {
    LlmProviderConfig {
        name: settings.name.clone(),
        base_url: settings.base_url.clone(),
        api_key_env: settings.api_key_env.clone(),
        headers: settings.headers.clone(),
        timeout_secs: Some(settings.timeout_secs),
    }
}

/// Build the chat completion provider. An inline key wins over the env var.
pub fn build_provider(settings: &ProviderSettings) -> OpenAiCompatProvider {
    let config = provider_config(settings);
    if settings.api_key.is_empty() {
        OpenAiCompatProvider::new(config)
    } else {
        OpenAiCompatProvider::with_api_key(config, settings.api_key.expose().to_string())
    }
}

/// Build an orchestrator talking to the configured provider.
pub fn build_orchestrator(config: &Config) -> Orchestrator {
    let provider: Arc<dyn Provider> = Arc::new(build_provider(&config.provider));
    info!(
        provider = %config.provider.name,
        optimizer = %config.stages.optimizer.model,
        generator = %config.stages.generator.model,
        reviewer = %config.stages.reviewer.model,
        "pipeline configured"
    );
    let client = ProviderStageClient::new(provider, config.stages.clone());
    Orchestrator::new(Arc::new(client), config.pipeline.clone())
}
