//! Deterministic trigram embedding provider.
//!
//! Hashes character trigrams and word frequencies into a fixed-size
//! vector. Not semantically accurate like a real embedding model, but
//! deterministic and content-dependent, which is what tests and offline
//! runs need.

use crate::embeddings::{clip_input, EmbeddingProvider};
use consult_core::AppResult;
use std::collections::{HashMap, HashSet};

const DIMENSIONS: usize = 384;

/// Common words excluded before hashing, for better discrimination.
const STOP_WORDS: [&str; 31] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they",
];

/// Trigram-hash embedding provider.
#[derive(Debug, Default)]
pub struct TrigramEmbedder;

impl TrigramEmbedder {
    pub fn new() -> Self {
        Self
    }
}

fn fold_hash(input: &str, multiplier: u64) -> u64 {
    input
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

fn embed_text(text: &str) -> Vec<f32> {
    let mut embedding = vec![0.0; DIMENSIONS];

    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let lower = clip_input(text).to_lowercase();

    let words: Vec<&str> = lower
        .split_whitespace()
        .filter(|w| !stop_words.contains(w) && w.len() > 2)
        .collect();

    let mut word_freq: HashMap<&str, u32> = HashMap::new();
    for word in &words {
        *word_freq.entry(word).or_insert(0) += 1;
    }

    for (word, freq) in &word_freq {
        // Character trigrams spread each word over several dimensions
        let chars: Vec<char> = word.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let dim = (fold_hash(&trigram, 37) as usize) % DIMENSIONS;
            embedding[dim] += (*freq as f32).sqrt();
        }

        // Whole-word signal
        let dim = (fold_hash(word, 31) as usize) % DIMENSIONS;
        embedding[dim] += *freq as f32;
    }

    // Normalize to a unit vector
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut embedding {
            *v /= norm;
        }
    }

    embedding
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(embed_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_dimensions_and_normalization() {
        let embedder = TrigramEmbedder::new();
        let embedding = embedder.embed("quarterly revenue projections").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = TrigramEmbedder::new();
        let first = embedder.embed("project status update").await.unwrap();
        let second = embedder.embed("project status update").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let embedder = TrigramEmbedder::new();
        let first = embedder.embed("pricing proposal").await.unwrap();
        let second = embedder.embed("vacation schedule").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = TrigramEmbedder::new();
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let embedder = TrigramEmbedder::new();
        let embedding = embedder
            .embed("relatório de preços 💼 para o cliente")
            .await
            .unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
