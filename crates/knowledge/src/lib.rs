//! Retrieval-and-answer core for consult.
//!
//! A question flows through the pipeline as: classify intent, retrieve
//! documents through a layered strategy chain, assemble a bounded context
//! block, build an intent-shaped prompt, and synthesize an answer with an
//! LLM. The [`Assistant`] orchestrator guarantees a well-formed
//! [`AnswerResult`] for every call; nothing past its boundary ever sees an
//! error.

pub mod classify;
pub mod context;
pub mod embeddings;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod retrieve;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use classify::classify;
pub use embeddings::EmbeddingProvider;
pub use pipeline::Assistant;
pub use profile::TableProfile;
pub use retrieve::Retriever;
pub use store::{KnowledgeStore, MemoryStore, PostgrestStore};
pub use types::{AnswerResult, Document, QueryIntent, RetrievalLimits, RetrievedSet, SearchStrategy};
