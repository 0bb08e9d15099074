//! PostgREST-dialect HTTP knowledge store.
//!
//! Talks to a Supabase-style REST endpoint: row reads go through
//! `/rest/v1/{table}` with query-string filters, similarity search goes
//! through an RPC function taking an embedding, a threshold, and a count.

use crate::store::{KnowledgeStore, Record};
use consult_core::{AppError, AppResult};
use std::time::Duration;

/// Request timeout for store calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default similarity-search RPC function name.
const DEFAULT_SIMILARITY_RPC: &str = "match_documents";

/// HTTP client for a PostgREST-style knowledge store.
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    similarity_rpc: String,
    client: reqwest::Client,
}

impl PostgrestStore {
    /// Create a store client for a base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        let base_url: String = base_url.into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            similarity_rpc: DEFAULT_SIMILARITY_RPC.to_string(),
            client,
        }
    }

    /// Override the similarity-search RPC function name.
    pub fn with_similarity_rpc(mut self, rpc: impl Into<String>) -> Self {
        self.similarity_rpc = rpc.into();
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.similarity_rpc)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows(&self, request: reqwest::RequestBuilder) -> AppResult<Vec<Record>> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Store request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Store(format!(
                "Store API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse store response: {}", e)))
    }
}

/// Build a PostgREST `or=` filter matching `query` as a case-insensitive
/// substring of any of the given fields.
fn ilike_filter(fields: &[String], query: &str) -> String {
    let pattern = sanitize_pattern(query);
    let clauses: Vec<String> = fields
        .iter()
        .map(|field| format!("{}.ilike.*{}*", field, pattern))
        .collect();
    format!("({})", clauses.join(","))
}

/// Strip characters that have meaning in the PostgREST filter grammar so a
/// query can be embedded in an `ilike` pattern verbatim.
fn sanitize_pattern(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%'))
        .collect()
}

#[async_trait::async_trait]
impl KnowledgeStore for PostgrestStore {
    async fn sample(&self, table: &str, limit: usize) -> AppResult<Vec<Record>> {
        tracing::debug!(table, limit, "Sampling rows from store");

        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("limit", &limit.to_string())]);

        self.fetch_rows(request).await
    }

    async fn search_fields(
        &self,
        table: &str,
        fields: &[String],
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(table, ?fields, "Substring search against store");

        let request = self.client.get(self.table_url(table)).query(&[
            ("select", "*"),
            ("or", &ilike_filter(fields, query)),
            ("limit", &limit.to_string()),
        ]);

        self.fetch_rows(request).await
    }

    async fn recent(&self, table: &str, limit: usize) -> AppResult<Vec<Record>> {
        tracing::debug!(table, limit, "Fetching most recent rows from store");

        let request = self.client.get(self.table_url(table)).query(&[
            ("select", "*"),
            ("order", "id.desc"),
            ("limit", &limit.to_string()),
        ]);

        self.fetch_rows(request).await
    }

    async fn similarity_search(
        &self,
        table: &str,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> AppResult<Vec<(Record, f32)>> {
        tracing::debug!(
            table,
            threshold,
            limit,
            dimensions = embedding.len(),
            "Similarity search via store RPC"
        );

        let body = serde_json::json!({
            "query_embedding": embedding,
            "match_threshold": threshold,
            "match_count": limit,
        });

        let request = self.client.post(self.rpc_url()).json(&body);
        let rows = self.fetch_rows(request).await?;

        let scored = rows
            .into_iter()
            .map(|row| {
                let score = row
                    .get("similarity")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0) as f32;
                (row, score)
            })
            .collect();

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ilike_filter_joins_fields() {
        let fields = vec!["title".to_string(), "content".to_string()];
        let filter = ilike_filter(&fields, "automation");
        assert_eq!(filter, "(title.ilike.*automation*,content.ilike.*automation*)");
    }

    #[test]
    fn test_sanitize_pattern_strips_grammar_chars() {
        assert_eq!(
            sanitize_pattern("price (q3, q4) * 100%"),
            "price q3 q4  100"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = PostgrestStore::new("https://db.example.com/", "key");
        assert_eq!(store.table_url("documents"), "https://db.example.com/rest/v1/documents");
    }

    #[test]
    fn test_rpc_url_uses_configured_function() {
        let store = PostgrestStore::new("https://db.example.com", "key")
            .with_similarity_rpc("match_files");
        assert_eq!(store.rpc_url(), "https://db.example.com/rest/v1/rpc/match_files");
    }
}
