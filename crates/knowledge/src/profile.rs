//! Knowledge-base schema probing and field extraction.
//!
//! The store's schema is not assumed fixed. At startup a single record is
//! sampled and its keys intersected with fixed priority lists to decide
//! which fields hold display titles and searchable text. Everything
//! downstream extracts through the resulting [`TableProfile`].

use crate::store::KnowledgeStore;
use crate::types::Document;
use serde::{Deserialize, Serialize};

/// Fields probed for a display title, in priority order.
pub const TITLE_FIELD_PRIORITY: [&str; 4] = ["title", "name", "filename", "file_path"];

/// Fields probed for body text, in priority order.
pub const BODY_FIELD_PRIORITY: [&str; 5] = ["content", "text", "body", "description", "summary"];

/// Alternate tables probed when the primary table yields nothing.
const FALLBACK_TABLES: [&str; 4] = ["document", "files", "content", "knowledge"];

/// Title used when no candidate field yields a value.
pub const UNKNOWN_TITLE: &str = "Unknown Document";

/// The knowledge-base schema as discovered at startup.
///
/// Immutable once probed; `ask` calls share it read-only, so concurrent
/// callers need no locking. Re-probing is an explicit operation on the
/// assistant, never implicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    /// Table the profile was derived from
    pub table: String,

    /// Field names that may hold a display title, first present wins
    pub title_fields: Vec<String>,

    /// Field names that may hold body text, first present wins
    pub body_fields: Vec<String>,

    /// False when probing failed; the retriever degrades to returning
    /// no documents rather than raising
    pub available: bool,
}

impl TableProfile {
    /// Profile for a store that could not be probed. Candidate lists are
    /// empty and retrieval degrades gracefully.
    pub fn unavailable(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            title_fields: Vec::new(),
            body_fields: Vec::new(),
            available: false,
        }
    }

    /// Derive a profile from one sampled record.
    ///
    /// Candidate lists are the intersection of the record's keys with the
    /// fixed priority lists, priority order preserved.
    pub fn from_sample(table: impl Into<String>, sample: &serde_json::Value) -> Self {
        let keys: Vec<&str> = sample
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();

        let title_fields = TITLE_FIELD_PRIORITY
            .iter()
            .filter(|candidate| keys.contains(candidate))
            .map(|candidate| candidate.to_string())
            .collect();

        let body_fields = BODY_FIELD_PRIORITY
            .iter()
            .filter(|candidate| keys.contains(candidate))
            .map(|candidate| candidate.to_string())
            .collect();

        Self {
            table: table.into(),
            title_fields,
            body_fields,
            available: true,
        }
    }

    /// Extract a title from a document: first non-empty candidate field
    /// wins.
    pub fn extract_title(&self, doc: &Document) -> Option<String> {
        extract_first(&doc.fields, &self.title_fields)
    }

    /// Extract body text from a document: first non-empty candidate field
    /// wins.
    pub fn extract_body(&self, doc: &Document) -> Option<String> {
        extract_first(&doc.fields, &self.body_fields)
    }

    /// Title for user-facing source lists, with the fixed fallback.
    pub fn display_title(&self, doc: &Document) -> String {
        self.extract_title(doc)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }
}

/// First non-empty string value among the candidate fields, in order.
fn extract_first(fields: &serde_json::Value, candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        fields
            .get(candidate)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

/// Probe the store for a usable table and schema.
///
/// Samples one record from the primary table, then from each fallback
/// table in fixed order; the first table that yields data wins. Network
/// and auth errors are absorbed: if nothing can be sampled the profile
/// comes back unavailable, never as an error.
pub async fn probe(store: &dyn KnowledgeStore, primary_table: &str) -> TableProfile {
    let mut tables: Vec<&str> = vec![primary_table];
    tables.extend(FALLBACK_TABLES.iter().filter(|t| **t != primary_table));

    for table in tables {
        match store.sample(table, 1).await {
            Ok(rows) => {
                if let Some(sample) = rows.first() {
                    let profile = TableProfile::from_sample(table, sample);
                    tracing::info!(
                        table,
                        title_fields = ?profile.title_fields,
                        body_fields = ?profile.body_fields,
                        "Probed knowledge-base schema"
                    );
                    return profile;
                }
                tracing::debug!(table, "Table is empty, trying next candidate");
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "Schema probe failed for table");
            }
        }
    }

    tracing::warn!(
        table = primary_table,
        "No table yielded a sample; profile marked unavailable"
    );
    TableProfile::unavailable(primary_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_from_sample_preserves_priority_order() {
        let sample = json!({"name": "x", "title": "y", "summary": "z", "content": "w", "id": 1});
        let profile = TableProfile::from_sample("documents", &sample);

        // title before name, content before summary, regardless of key order
        assert_eq!(profile.title_fields, vec!["title", "name"]);
        assert_eq!(profile.body_fields, vec!["content", "summary"]);
        assert!(profile.available);
    }

    #[test]
    fn test_extract_title_falls_through_candidates() {
        let profile = TableProfile {
            table: "documents".to_string(),
            title_fields: vec!["title".to_string(), "name".to_string()],
            body_fields: vec!["body".to_string()],
            available: true,
        };

        let doc = Document::from_record(json!({"name": "Q3 Report", "body": "..."}));
        assert_eq!(profile.extract_title(&doc), Some("Q3 Report".to_string()));
    }

    #[test]
    fn test_extract_skips_empty_values() {
        let profile = TableProfile {
            table: "documents".to_string(),
            title_fields: vec!["title".to_string(), "name".to_string()],
            body_fields: Vec::new(),
            available: true,
        };

        let doc = Document::from_record(json!({"title": "  ", "name": "Fallback"}));
        assert_eq!(profile.extract_title(&doc), Some("Fallback".to_string()));
    }

    #[test]
    fn test_display_title_fallback() {
        let profile = TableProfile::unavailable("documents");
        let doc = Document::from_record(json!({"title": "ignored"}));
        // unavailable profile has no candidate fields
        assert_eq!(profile.display_title(&doc), UNKNOWN_TITLE);
    }

    #[tokio::test]
    async fn test_probe_primary_table() {
        let store = MemoryStore::new().with_table(
            "documents",
            vec![json!({"id": 1, "title": "A", "content": "B"})],
        );

        let profile = probe(&store, "documents").await;
        assert!(profile.available);
        assert_eq!(profile.table, "documents");
        assert_eq!(profile.title_fields, vec!["title"]);
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_alternate_table() {
        let store = MemoryStore::new()
            .with_table("documents", Vec::new())
            .with_table("files", vec![json!({"id": 1, "filename": "deck.pdf", "text": "..."})]);

        let profile = probe(&store, "documents").await;
        assert!(profile.available);
        assert_eq!(profile.table, "files");
        assert_eq!(profile.title_fields, vec!["filename"]);
        assert_eq!(profile.body_fields, vec!["text"]);
    }

    #[tokio::test]
    async fn test_probe_absorbs_errors_into_unavailable() {
        let store = MemoryStore::new().failing_sample();

        let profile = probe(&store, "documents").await;
        assert!(!profile.available);
        assert!(profile.title_fields.is_empty());
        assert!(profile.body_fields.is_empty());
    }
}
