//! LLM provider factory.
//!
//! This module creates chat-completion clients from the consolidated
//! configuration. It resolves the provider, checks required secrets and
//! picks the model name used in every request.

use crate::client::LlmClient;
use crate::providers::{ollama::DEFAULT_OLLAMA_URL, AzureChatClient, OllamaClient};
use crate::types::ProviderType;
use hurtbot_core::config::LlmSettings;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client from provider settings.
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required endpoint or API key is missing
/// - HTTP client initialization fails
pub fn create_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, String> {
    let provider = ProviderType::parse(&settings.provider)
        .ok_or_else(|| format!("Unknown provider: {}", settings.provider))?;
    let timeout = Duration::from_secs(settings.timeout_secs);

    match provider {
        ProviderType::Azure => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .ok_or("Azure provider requires an endpoint")?;
            let api_key = settings
                .api_key
                .as_deref()
                .ok_or("Azure provider requires API key")?;

            let client = AzureChatClient::new(endpoint, api_key, &settings.api_version, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_base_url(base_url, timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
    }
}

/// Resolve the model (deployment) name requests should carry.
pub fn resolve_model(settings: &LlmSettings) -> Result<String, String> {
    if let Some(model) = &settings.model {
        return Ok(model.clone());
    }

    ProviderType::parse(&settings.provider)
        .and_then(|p| p.default_model())
        .map(str::to_string)
        .ok_or_else(|| format!("No model configured for provider {}", settings.provider))
}
