//! Knowledge store abstraction.
//!
//! The knowledge base is an external service; this module defines the
//! four reads the pipeline requires of it and the implementations: a
//! PostgREST-dialect HTTP store for production and an in-memory store for
//! tests and offline runs.

pub mod http;
pub mod memory;

pub use http::PostgrestStore;
pub use memory::MemoryStore;

use consult_core::AppResult;

/// A raw, untyped record as returned by the store.
pub type Record = serde_json::Value;

/// Contract the retrieval pipeline requires of a knowledge-base store.
///
/// Implementations must be read-only: nothing in the pipeline ever
/// mutates the knowledge base.
#[async_trait::async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Fetch up to `limit` arbitrary rows from a table. Used by schema
    /// probing.
    async fn sample(&self, table: &str, limit: usize) -> AppResult<Vec<Record>>;

    /// Case-insensitive substring match of `query` against any of the
    /// named fields (logical OR), capped at `limit`.
    async fn search_fields(
        &self,
        table: &str,
        fields: &[String],
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>>;

    /// Most recently inserted rows first (descending id), capped at
    /// `limit`.
    async fn recent(&self, table: &str, limit: usize) -> AppResult<Vec<Record>>;

    /// Vector similarity search. Returns ranked rows paired with their
    /// similarity scores; rows below `threshold` are excluded.
    async fn similarity_search(
        &self,
        table: &str,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> AppResult<Vec<(Record, f32)>>;
}
