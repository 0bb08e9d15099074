//! Prompt construction.
//!
//! Two fixed templates, selected by query intent: a direct-answer
//! template for simple lookups and a structured consultant template for
//! everything else. Question and context are embedded verbatim; no
//! truncation happens at this stage.

use crate::types::QueryIntent;
use consult_core::{AppError, AppResult};
use handlebars::Handlebars;

const DIRECT_TEMPLATE: &str = "\
You are a business assistant. Provide a direct, factual answer.

Context from business documents:
{{context}}

Question: {{question}}

Provide a direct answer. If the context doesn't contain the answer, say so clearly.";

const CONSULTANT_TEMPLATE: &str = "\
You are a senior business consultant with access to comprehensive business knowledge.

Context from business documents:
{{context}}

Question: {{question}}

Provide a strategic business response with:
1. IMMEDIATE_ANSWER (direct response to the question)
2. KEY_INSIGHTS (relevant information from the context)
3. RECOMMENDED_ACTIONS (specific next steps)
4. BUSINESS_IMPACT (potential implications)

Be direct, actionable, and business-focused. If the context is insufficient, recommend gathering more information.";

/// Renders intent-shaped prompts from registered templates.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Register both templates. Fails only if a template is malformed,
    /// which would be a programming error caught at startup.
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text prompts, no HTML escaping
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string("direct", DIRECT_TEMPLATE)
            .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

        registry
            .register_template_string("consultant", CONSULTANT_TEMPLATE)
            .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Build the prompt for a question, its assembled context, and its
    /// intent.
    pub fn build(&self, question: &str, context: &str, intent: QueryIntent) -> AppResult<String> {
        let template = match intent {
            QueryIntent::Simple => "direct",
            QueryIntent::Medium | QueryIntent::Complex => "consultant",
        };

        let data = serde_json::json!({
            "question": question,
            "context": context,
        });

        self.registry
            .render(template, &data)
            .map_err(|e| AppError::Other(format!("Failed to render prompt: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_intent_uses_direct_template() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder
            .build("What is the price?", "Document: Pricing\nContent: $100", QueryIntent::Simple)
            .unwrap();

        assert!(prompt.contains("business assistant"));
        assert!(prompt.contains("Question: What is the price?"));
        assert!(prompt.contains("Document: Pricing"));
        assert!(!prompt.contains("IMMEDIATE_ANSWER"));
    }

    #[test]
    fn test_medium_and_complex_use_consultant_template() {
        let builder = PromptBuilder::new().unwrap();

        for intent in [QueryIntent::Medium, QueryIntent::Complex] {
            let prompt = builder.build("Tell me about Q3", "ctx", intent).unwrap();
            assert!(prompt.contains("senior business consultant"));
            assert!(prompt.contains("IMMEDIATE_ANSWER"));
            assert!(prompt.contains("KEY_INSIGHTS"));
            assert!(prompt.contains("RECOMMENDED_ACTIONS"));
            assert!(prompt.contains("BUSINESS_IMPACT"));
        }
    }

    #[test]
    fn test_question_and_context_embedded_verbatim() {
        let builder = PromptBuilder::new().unwrap();
        let question = "Should we <b>expand</b> & hire?";
        let context = "Document: Plan\nContent: 100% growth & \"bold\" moves";

        let prompt = builder.build(question, context, QueryIntent::Complex).unwrap();
        // no_escape: HTML-significant characters pass through untouched
        assert!(prompt.contains(question));
        assert!(prompt.contains(context));
    }
}
