//! LLM provider factory.
//!
//! Creates LLM clients from a provider name plus optional endpoint and
//! API key, so callers never depend on concrete provider types.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use consult_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (Gemini requires one)
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a
/// required API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => GeminiClient::with_base_url(endpoint, api_key),
                None => GeminiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
