//! Query embedding generation.
//!
//! Provider-agnostic embedding of query text for semantic search.

pub mod ollama;
pub mod trigram;

pub use ollama::OllamaEmbedder;
pub use trigram::TrigramEmbedder;

use consult_core::{AppError, AppResult};
use std::sync::Arc;

/// Maximum characters sent to an embedding backend per request.
pub const MAX_EMBED_INPUT_CHARS: usize = 8000;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embedding vector dimensions
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text. Implementations must
    /// clip input to [`MAX_EMBED_INPUT_CHARS`].
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider by name.
pub fn create_provider(
    provider: &str,
    model: &str,
    endpoint: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "ollama" => {
            let embedder = match endpoint {
                Some(endpoint) => OllamaEmbedder::with_base_url(endpoint, model),
                None => OllamaEmbedder::new(model),
            };
            Ok(Arc::new(embedder))
        }
        "trigram" => Ok(Arc::new(TrigramEmbedder::default())),
        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            provider
        ))),
    }
}

/// Clip text to the embedding input budget on a char boundary.
pub(crate) fn clip_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_EMBED_INPUT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", "trigram-v1", None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", "m", None);
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_clip_input_short_text_untouched() {
        assert_eq!(clip_input("hello"), "hello");
    }

    #[test]
    fn test_clip_input_respects_char_boundaries() {
        let text = "é".repeat(MAX_EMBED_INPUT_CHARS + 10);
        let clipped = clip_input(&text);
        assert_eq!(clipped.chars().count(), MAX_EMBED_INPUT_CHARS);
    }
}
