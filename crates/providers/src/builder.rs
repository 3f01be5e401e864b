//! Provider construction from configuration.

use std::sync::Arc;
use tracing::{info, warn};
use turnwise_config::AppConfig;
use turnwise_core::error::ProviderError;
use turnwise_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the completion gateway described by `config`.
///
/// Fails with [`ProviderError::NotConfigured`] when no base URL is set and
/// the provider has no well-known one.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.provider.name.as_str();
    let base_url = resolve_base_url(config)?;
    let api_key = if let Some(key) = &config.api_key {
        key.clone()
    } else if is_local_provider(name) {
        // Local servers accept any bearer token.
        name.to_string()
    } else {
        warn!(provider = %name, "No API key configured; requests will likely be rejected");
        String::new()
    };

    info!(provider = %name, base_url = %base_url, "Using completion provider");
    Ok(Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)))
}

/// The configured base URL, falling back to the provider's well-known one.
pub fn resolve_base_url(config: &AppConfig) -> Result<&str, ProviderError> {
    let name = config.provider.name.as_str();
    config
        .provider
        .api_url
        .as_deref()
        .or_else(|| default_base_url(name))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "provider '{name}' has no known base URL; set provider.api_url"
            ))
        })
}

/// Whether the named provider is a local server that needs no real API key.
pub fn is_local_provider(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp")
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "openai" => Some("https://api.openai.com/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "vllm" => Some("http://localhost:8000/v1"),
        "llamacpp" => Some("http://localhost:8080/v1"),
        _ => None,
    }
}
