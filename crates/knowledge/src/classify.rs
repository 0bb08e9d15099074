//! Keyword-based query classification.
//!
//! Maps a raw question string to a coarse intent category that tunes
//! retrieval breadth and prompt shape downstream.

use crate::types::QueryIntent;

/// Triggers for strategic, multi-part questions. Checked first: a question
/// like "How should I respond?" contains the simple trigger "how" but must
/// classify as complex.
const COMPLEX_TRIGGERS: [&str; 7] = [
    "compare",
    "analyze",
    "recommend",
    "strategy",
    "approach",
    "best",
    "how should",
];

/// Triggers for direct factual lookups.
const SIMPLE_TRIGGERS: [&str; 8] = [
    "what", "who", "when", "where", "contact", "email", "phone", "price",
];

/// Classify a question by case-insensitive substring match.
///
/// Complex triggers take precedence over simple triggers; anything that
/// matches neither set is `Medium`.
pub fn classify(question: &str) -> QueryIntent {
    let lower = question.to_lowercase();

    if COMPLEX_TRIGGERS.iter().any(|kw| lower.contains(kw)) {
        QueryIntent::Complex
    } else if SIMPLE_TRIGGERS.iter().any(|kw| lower.contains(kw)) {
        QueryIntent::Simple
    } else {
        QueryIntent::Medium
    }
}
