//! In-memory knowledge store.
//!
//! Deterministic stand-in for the HTTP store, used by the test suite and
//! offline runs. Failure injection and call counters let tests exercise
//! the fallback chain and the no-network guarantees.

use crate::store::{KnowledgeStore, Record};
use consult_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory, read-only document store.
///
/// Similarity search is scripted rather than computed: a record takes
/// part when it carries a numeric `similarity` field, which doubles as
/// its score.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Record>>,
    fail_sample: bool,
    fail_search: bool,
    fail_recent: bool,
    fail_similarity: bool,
    sample_calls: AtomicUsize,
    search_calls: AtomicUsize,
    recent_calls: AtomicUsize,
    similarity_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with records (insertion order is recency order).
    pub fn with_table(mut self, table: impl Into<String>, records: Vec<Record>) -> Self {
        self.tables.insert(table.into(), records);
        self
    }

    /// Make `sample` return an error.
    pub fn failing_sample(mut self) -> Self {
        self.fail_sample = true;
        self
    }

    /// Make `search_fields` return an error.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Make `recent` return an error.
    pub fn failing_recent(mut self) -> Self {
        self.fail_recent = true;
        self
    }

    /// Make `similarity_search` return an error.
    pub fn failing_similarity(mut self) -> Self {
        self.fail_similarity = true;
        self
    }

    /// Number of `search_fields` calls issued so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }

    /// Number of `recent` calls issued so far.
    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::Relaxed)
    }

    /// Number of `similarity_search` calls issued so far.
    pub fn similarity_calls(&self) -> usize {
        self.similarity_calls.load(Ordering::Relaxed)
    }

    /// Total calls of any kind, for asserting that nothing was issued.
    pub fn total_calls(&self) -> usize {
        self.sample_calls.load(Ordering::Relaxed)
            + self.search_calls()
            + self.recent_calls()
            + self.similarity_calls()
    }

    fn rows(&self, table: &str) -> Vec<Record> {
        self.tables.get(table).cloned().unwrap_or_default()
    }
}

/// Check whether any of the named fields contains `query`,
/// case-insensitively.
fn matches_any_field(record: &Record, fields: &[String], query: &str) -> bool {
    let needle = query.to_lowercase();
    fields.iter().any(|field| {
        record
            .get(field)
            .and_then(|v| v.as_str())
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

#[async_trait::async_trait]
impl KnowledgeStore for MemoryStore {
    async fn sample(&self, table: &str, limit: usize) -> AppResult<Vec<Record>> {
        self.sample_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_sample {
            return Err(AppError::Store("injected sample failure".to_string()));
        }

        Ok(self.rows(table).into_iter().take(limit).collect())
    }

    async fn search_fields(
        &self,
        table: &str,
        fields: &[String],
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_search {
            return Err(AppError::Store("injected search failure".to_string()));
        }

        Ok(self
            .rows(table)
            .into_iter()
            .filter(|record| matches_any_field(record, fields, query))
            .take(limit)
            .collect())
    }

    async fn recent(&self, table: &str, limit: usize) -> AppResult<Vec<Record>> {
        self.recent_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_recent {
            return Err(AppError::Store("injected recency failure".to_string()));
        }

        Ok(self.rows(table).into_iter().rev().take(limit).collect())
    }

    async fn similarity_search(
        &self,
        table: &str,
        _embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> AppResult<Vec<(Record, f32)>> {
        self.similarity_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_similarity {
            return Err(AppError::Store("injected similarity failure".to_string()));
        }

        let mut scored: Vec<(Record, f32)> = self
            .rows(table)
            .into_iter()
            .filter_map(|record| {
                let score = record.get("similarity").and_then(|v| v.as_f64())? as f32;
                (score >= threshold).then_some((record, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> MemoryStore {
        MemoryStore::new().with_table(
            "documents",
            vec![
                json!({"id": 1, "title": "Q3 Report", "content": "Revenue grew.", "similarity": 0.9}),
                json!({"id": 2, "title": "Client Notes", "content": "Automation rollout."}),
                json!({"id": 3, "title": "Pricing Sheet", "content": "Tiered pricing."}),
            ],
        )
    }

    #[tokio::test]
    async fn test_sample_returns_first_rows() {
        let store = seeded();
        let rows = store.sample("documents", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_or() {
        let store = seeded();
        let fields = vec!["title".to_string(), "content".to_string()];
        let rows = store
            .search_fields("documents", &fields, "AUTOMATION", 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 2);
    }

    #[tokio::test]
    async fn test_recent_is_reverse_insertion_order() {
        let store = seeded();
        let rows = store.recent("documents", 2).await.unwrap();
        assert_eq!(rows[0]["id"], 3);
        assert_eq!(rows[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_similarity_uses_scripted_scores() {
        let store = seeded();
        let results = store
            .similarity_search("documents", &[0.0; 4], 0.3, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, 0.9);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = seeded().failing_search();
        let fields = vec!["title".to_string()];
        assert!(store
            .search_fields("documents", &fields, "q", 5)
            .await
            .is_err());
        assert_eq!(store.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_table_is_empty() {
        let store = seeded();
        let rows = store.sample("missing", 5).await.unwrap();
        assert!(rows.is_empty());
    }
}
