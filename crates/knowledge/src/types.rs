//! Pipeline type definitions.

use serde::{Deserialize, Serialize};

/// Coarse classification of a question's complexity.
///
/// Drives retrieval breadth and prompt template selection. Derived purely
/// from the question text; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Simple,
    Medium,
    Complex,
}

impl QueryIntent {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

/// One discrete method of locating candidate documents.
///
/// Strategies are tried in declaration order; the first non-empty result
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Vector similarity over query embeddings
    Semantic,
    /// Case-insensitive substring match over title and body fields
    Keyword,
    /// Substring match restricted to title fields
    Title,
    /// Most recently inserted records, regardless of relevance
    Recency,
}

impl SearchStrategy {
    /// All strategies in fallback order.
    pub const CHAIN: [SearchStrategy; 4] = [
        Self::Semantic,
        Self::Keyword,
        Self::Title,
        Self::Recency,
    ];

    /// Canonical lowercase name, for log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Title => "title",
            Self::Recency => "recency",
        }
    }
}

/// A retrieved knowledge-base record.
///
/// Field extraction is schema-agnostic: the full untyped record is kept in
/// `fields` and titles/bodies are pulled out later through the probed
/// [`crate::profile::TableProfile`]. Documents live only for the duration
/// of a single `ask` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque record identifier
    pub id: String,

    /// Similarity score, present only for vector-search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,

    /// The full untyped record
    pub fields: serde_json::Value,
}

impl Document {
    /// Wrap a raw store record, deriving the id from its `id` field.
    pub fn from_record(fields: serde_json::Value) -> Self {
        let id = match fields.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        Self {
            id,
            similarity: None,
            fields,
        }
    }

    /// Wrap a vector-search result carrying a similarity score.
    pub fn with_similarity(fields: serde_json::Value, similarity: f32) -> Self {
        let mut doc = Self::from_record(fields);
        doc.similarity = Some(similarity);
        doc
    }
}

/// The outcome of a retrieval pass, tagged with the producing strategy.
#[derive(Debug, Clone)]
pub struct RetrievedSet {
    /// Documents in the order the strategy returned them
    pub documents: Vec<Document>,

    /// Which strategy produced the documents; `None` when every strategy
    /// came back empty
    pub strategy: Option<SearchStrategy>,
}

impl RetrievedSet {
    /// The valid, non-error outcome when all strategies fail or return
    /// nothing.
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            strategy: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Result limits per query intent.
///
/// Simple questions need a narrow context; everything else gets a wider
/// net.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalLimits {
    /// Limit for simple-intent questions
    pub simple: usize,

    /// Limit for medium and complex questions
    pub default: usize,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            simple: 3,
            default: 5,
        }
    }
}

impl RetrievalLimits {
    /// Resolve the document limit for an intent.
    pub fn for_intent(&self, intent: QueryIntent) -> usize {
        match intent {
            QueryIntent::Simple => self.simple,
            _ => self.default,
        }
    }
}

/// The unit returned to the caller for every question.
///
/// Invariants: `source_count == sources.len()` and `response` is never
/// empty. Constructed only through the helpers below so the invariants
/// cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Echo of the input question
    pub question: String,

    /// Generated text, or explanatory failure text
    pub response: String,

    /// Classified intent; absent for blank questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_intent: Option<QueryIntent>,

    /// Display titles of the retrieved documents, in retrieval order
    pub sources: Vec<String>,

    /// Always equal to `sources.len()`
    pub source_count: usize,
}

impl AnswerResult {
    /// Package a pipeline outcome.
    pub fn new(
        question: impl Into<String>,
        response: impl Into<String>,
        query_intent: Option<QueryIntent>,
        sources: Vec<String>,
    ) -> Self {
        let mut response = response.into();
        if response.trim().is_empty() {
            response =
                "The model returned an empty response. Please try rephrasing your question."
                    .to_string();
        }

        let source_count = sources.len();
        Self {
            question: question.into(),
            response,
            query_intent,
            sources,
            source_count,
        }
    }

    /// Fixed result for empty or whitespace-only questions.
    pub fn prompt_for_question(question: impl Into<String>) -> Self {
        Self::new(
            question,
            "Please ask a specific business question.",
            None,
            Vec::new(),
        )
    }

    /// Fixed result for unexpected internal failures.
    pub fn system_error(question: impl Into<String>, detail: &str) -> Self {
        Self::new(
            question,
            format!("System error: {}. Please check your configuration.", detail),
            None,
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_from_string() {
        let doc = Document::from_record(json!({"id": "abc-123", "title": "Report"}));
        assert_eq!(doc.id, "abc-123");
        assert!(doc.similarity.is_none());
    }

    #[test]
    fn test_document_id_from_number() {
        let doc = Document::from_record(json!({"id": 42}));
        assert_eq!(doc.id, "42");
    }

    #[test]
    fn test_document_missing_id() {
        let doc = Document::from_record(json!({"title": "No id here"}));
        assert_eq!(doc.id, "");
    }

    #[test]
    fn test_document_with_similarity() {
        let doc = Document::with_similarity(json!({"id": 7}), 0.82);
        assert_eq!(doc.similarity, Some(0.82));
    }

    #[test]
    fn test_answer_result_count_invariant() {
        let result = AnswerResult::new(
            "q",
            "a",
            Some(QueryIntent::Medium),
            vec!["Doc A".to_string(), "Doc B".to_string()],
        );
        assert_eq!(result.source_count, result.sources.len());
        assert_eq!(result.source_count, 2);
    }

    #[test]
    fn test_answer_result_never_empty_response() {
        let result = AnswerResult::new("q", "   ", Some(QueryIntent::Simple), Vec::new());
        assert!(!result.response.trim().is_empty());
    }

    #[test]
    fn test_prompt_for_question() {
        let result = AnswerResult::prompt_for_question("   ");
        assert_eq!(result.response, "Please ask a specific business question.");
        assert!(result.query_intent.is_none());
        assert_eq!(result.source_count, 0);
    }

    #[test]
    fn test_limits_per_intent() {
        let limits = RetrievalLimits::default();
        assert_eq!(limits.for_intent(QueryIntent::Simple), 3);
        assert_eq!(limits.for_intent(QueryIntent::Medium), 5);
        assert_eq!(limits.for_intent(QueryIntent::Complex), 5);
    }

    #[test]
    fn test_strategy_chain_order() {
        assert_eq!(
            SearchStrategy::CHAIN,
            [
                SearchStrategy::Semantic,
                SearchStrategy::Keyword,
                SearchStrategy::Title,
                SearchStrategy::Recency,
            ]
        );
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&QueryIntent::Complex).unwrap();
        assert_eq!(json, "\"complex\"");
    }
}
