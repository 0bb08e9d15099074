//! Context assembly.
//!
//! Formats the top retrieved documents into a bounded textual block for
//! the prompt. No re-ranking happens here; document order is whatever
//! the retrieval strategy produced.

use crate::profile::TableProfile;
use crate::types::Document;

/// Documents included in the context block.
pub const MAX_CONTEXT_DOCS: usize = 3;

/// Character budget per document body.
pub const MAX_CHARS_PER_DOC: usize = 1000;

/// Fixed sentinel for the no-documents case. The prompt builder keys off
/// this to instruct the model to fall back to general knowledge.
pub const NO_CONTEXT_SENTINEL: &str =
    "No specific documents found. Use general business knowledge.";

/// Body placeholder when no candidate field yields text.
const NO_CONTENT: &str = "No content available";

/// Assemble a context block with the default limits.
pub fn assemble(docs: &[Document], profile: &TableProfile) -> String {
    assemble_with_limits(docs, profile, MAX_CONTEXT_DOCS, MAX_CHARS_PER_DOC)
}

/// Assemble a context block from at most `max_docs` documents, bodies
/// truncated to `max_chars` characters each.
pub fn assemble_with_limits(
    docs: &[Document],
    profile: &TableProfile,
    max_docs: usize,
    max_chars: usize,
) -> String {
    if docs.is_empty() {
        return NO_CONTEXT_SENTINEL.to_string();
    }

    let blocks: Vec<String> = docs
        .iter()
        .take(max_docs)
        .map(|doc| {
            let title = profile.display_title(doc);
            let body = profile
                .extract_body(doc)
                .map(|body| truncate_chars(&body, max_chars))
                .unwrap_or_else(|| NO_CONTENT.to_string());

            format!("Document: {}\nContent: {}", title, body)
        })
        .collect();

    blocks.join("\n\n")
}

/// Truncate to a character count, respecting char boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
