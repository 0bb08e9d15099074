//! Layered document retrieval.
//!
//! Strategies run in a fixed fallback order (semantic, keyword,
//! title-only, recency) and the first non-empty result set wins. A
//! strategy that fails is logged and treated as empty, never as a
//! pipeline error; an all-empty outcome is valid and signals the
//! general-knowledge answer path downstream.

use crate::embeddings::EmbeddingProvider;
use crate::profile::TableProfile;
use crate::store::KnowledgeStore;
use crate::types::{Document, RetrievedSet, SearchStrategy};
use consult_core::AppResult;
use std::sync::Arc;

/// Minimum similarity score for a semantic match to count.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Executes the retrieval strategy chain against the knowledge store.
pub struct Retriever {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    profile: TableProfile,
    threshold: f32,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        profile: TableProfile,
    ) -> Self {
        Self {
            store,
            embedder,
            profile,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Override the semantic similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Retrieve up to `limit` documents for a query.
    ///
    /// With an unavailable profile there is nothing to search; the empty
    /// set is returned without touching the store.
    pub async fn retrieve(&self, query: &str, limit: usize) -> RetrievedSet {
        if !self.profile.available {
            tracing::debug!("Schema profile unavailable, skipping retrieval");
            return RetrievedSet::empty();
        }

        for strategy in SearchStrategy::CHAIN {
            match self.attempt(strategy, query, limit).await {
                Ok(documents) if !documents.is_empty() => {
                    tracing::info!(
                        strategy = strategy.as_str(),
                        count = documents.len(),
                        "Retrieval strategy produced documents"
                    );
                    return RetrievedSet {
                        documents,
                        strategy: Some(strategy),
                    };
                }
                Ok(_) => {
                    tracing::debug!(
                        strategy = strategy.as_str(),
                        "Retrieval strategy returned no documents"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.as_str(),
                        error = %e,
                        "Retrieval strategy failed, falling through"
                    );
                }
            }
        }

        tracing::info!("All retrieval strategies exhausted, returning empty set");
        RetrievedSet::empty()
    }

    async fn attempt(
        &self,
        strategy: SearchStrategy,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Document>> {
        match strategy {
            SearchStrategy::Semantic => self.semantic(query, limit).await,
            SearchStrategy::Keyword => self.keyword(query, limit).await,
            SearchStrategy::Title => self.title_only(query, limit).await,
            SearchStrategy::Recency => self.recency(limit).await,
        }
    }

    async fn semantic(&self, query: &str, limit: usize) -> AppResult<Vec<Document>> {
        let embedding = self.embedder.embed(query).await?;
        let scored = self
            .store
            .similarity_search(&self.profile.table, &embedding, self.threshold, limit)
            .await?;

        Ok(scored
            .into_iter()
            .map(|(record, score)| Document::with_similarity(record, score))
            .collect())
    }

    async fn keyword(&self, query: &str, limit: usize) -> AppResult<Vec<Document>> {
        let mut fields = self.profile.title_fields.clone();
        fields.extend(self.profile.body_fields.iter().cloned());

        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .store
            .search_fields(&self.profile.table, &fields, query, limit)
            .await?;

        Ok(records.into_iter().map(Document::from_record).collect())
    }

    async fn title_only(&self, query: &str, limit: usize) -> AppResult<Vec<Document>> {
        if self.profile.title_fields.is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .store
            .search_fields(&self.profile.table, &self.profile.title_fields, query, limit)
            .await?;

        Ok(records.into_iter().map(Document::from_record).collect())
    }

    /// Connectivity backstop: most recent records regardless of
    /// relevance.
    async fn recency(&self, limit: usize) -> AppResult<Vec<Document>> {
        let records = self.store.recent(&self.profile.table, limit).await?;
        Ok(records.into_iter().map(Document::from_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramEmbedder;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn profile() -> TableProfile {
        TableProfile {
            table: "documents".to_string(),
            title_fields: vec!["title".to_string()],
            body_fields: vec!["content".to_string()],
            available: true,
        }
    }

    fn retriever(store: Arc<MemoryStore>) -> Retriever {
        Retriever::new(store, Arc::new(TrigramEmbedder::new()), profile())
    }

    #[tokio::test]
    async fn test_semantic_results_carry_scores() {
        let store = Arc::new(MemoryStore::new().with_table(
            "documents",
            vec![
                json!({"id": 1, "title": "Roadmap", "content": "...", "similarity": 0.85}),
                json!({"id": 2, "title": "Notes", "content": "...", "similarity": 0.1}),
            ],
        ));

        let set = retriever(store).retrieve("roadmap", 5).await;
        assert_eq!(set.strategy, Some(SearchStrategy::Semantic));
        assert_eq!(set.documents.len(), 1);
        assert_eq!(set.documents[0].similarity, Some(0.85));
    }

    #[tokio::test]
    async fn test_semantic_failure_falls_back_to_keyword() {
        let store = Arc::new(
            MemoryStore::new()
                .with_table(
                    "documents",
                    vec![
                        json!({"id": 1, "title": "Automation plan", "content": "rollout"}),
                        json!({"id": 2, "title": "Other", "content": "automation budget"}),
                        json!({"id": 3, "title": "Unrelated", "content": "holiday"}),
                    ],
                )
                .failing_similarity(),
        );

        let set = retriever(Arc::clone(&store)).retrieve("automation", 5).await;

        assert_eq!(set.strategy, Some(SearchStrategy::Keyword));
        assert_eq!(set.documents.len(), 2);
        // keyword satisfied the query; later strategies must not run
        assert_eq!(store.search_calls(), 1);
        assert_eq!(store.recent_calls(), 0);
    }

    #[tokio::test]
    async fn test_title_only_after_keyword_misses() {
        // Query matches a title but search over title+content fails,
        // exercising the third rung.
        let store = Arc::new(MemoryStore::new().with_table(
            "documents",
            vec![json!({"id": 1, "title": "Budget", "content": "numbers"})],
        ));

        let retriever = retriever(Arc::clone(&store));
        let set = retriever.retrieve("budget", 5).await;

        // Keyword strategy matches the same record first; the title-only
        // rung is exercised through attempt directly.
        assert_eq!(set.strategy, Some(SearchStrategy::Keyword));

        let docs = retriever
            .attempt(SearchStrategy::Title, "budget", 5)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_recency_backstop() {
        let store = Arc::new(MemoryStore::new().with_table(
            "documents",
            vec![
                json!({"id": 1, "title": "Old", "content": "a"}),
                json!({"id": 2, "title": "New", "content": "b"}),
            ],
        ));

        // Query matches nothing, so recency wins with newest first.
        let set = retriever(store).retrieve("zzzz-no-match", 1).await;
        assert_eq!(set.strategy, Some(SearchStrategy::Recency));
        assert_eq!(set.documents.len(), 1);
        assert_eq!(set.documents[0].id, "2");
    }

    #[tokio::test]
    async fn test_total_failure_returns_empty_set() {
        let store = Arc::new(
            MemoryStore::new()
                .failing_similarity()
                .failing_search()
                .failing_recent(),
        );

        let set = retriever(store).retrieve("anything", 5).await;
        assert!(set.is_empty());
        assert!(set.strategy.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_profile_skips_store_entirely() {
        let store = Arc::new(MemoryStore::new());
        let retriever = Retriever::new(
            Arc::clone(&store) as Arc<dyn KnowledgeStore>,
            Arc::new(TrigramEmbedder::new()),
            TableProfile::unavailable("documents"),
        );

        let set = retriever.retrieve("anything", 5).await;
        assert!(set.is_empty());
        assert_eq!(store.total_calls(), 0);
    }
}
