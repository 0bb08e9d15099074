//! Answer pipeline orchestration.
//!
//! [`Assistant::ask`] sequences classify → retrieve → assemble → build →
//! generate and always returns a well-formed [`AnswerResult`]. Total
//! containment is the load-bearing invariant: no error of any stage ever
//! propagates past this boundary. A failed generation becomes answer
//! text; a failed retrieval becomes an empty source list.

use crate::classify::classify;
use crate::context;
use crate::embeddings::{self, EmbeddingProvider};
use crate::profile::{self, TableProfile};
use crate::prompt::PromptBuilder;
use crate::retrieve::Retriever;
use crate::store::{KnowledgeStore, PostgrestStore};
use crate::types::{AnswerResult, RetrievalLimits};
use consult_core::{AppConfig, AppResult};
use consult_llm::{create_client, LlmClient, LlmRequest};
use std::sync::Arc;

/// Sampling temperature for answer generation. Low, for factual answers.
const GENERATION_TEMPERATURE: f32 = 0.3;

/// Token budget for generated answers.
const GENERATION_MAX_TOKENS: u32 = 1024;

/// The retrieval-augmented answering pipeline.
///
/// Holds the store, embedding, and LLM clients plus the probed schema
/// profile. Everything is read-only after construction, so a shared
/// `Assistant` can serve concurrent `ask` calls without locking.
pub struct Assistant {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
    model: String,
    profile: TableProfile,
    prompts: PromptBuilder,
    limits: RetrievalLimits,
}

impl Assistant {
    /// Construct the pipeline from application configuration.
    ///
    /// Configuration problems (missing credentials, unknown providers)
    /// fail here, before any question is served. Schema probing is the
    /// exception: a store that cannot be probed yields an unavailable
    /// profile and the assistant still starts, degraded.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let store: Arc<dyn KnowledgeStore> =
            Arc::new(PostgrestStore::new(&config.store_url, &config.store_key));

        let embedder = embeddings::create_provider(
            &config.embedding_provider,
            &config.embedding_model,
            config.embedding_endpoint.as_deref(),
        )?;

        let llm = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;

        let profile = profile::probe(store.as_ref(), &config.table).await;

        Self::from_parts(store, embedder, llm, &config.model, profile)
    }

    /// Construct from explicit collaborators. The seam used by tests and
    /// offline runs with in-memory implementations.
    pub fn from_parts(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        profile: TableProfile,
    ) -> AppResult<Self> {
        Ok(Self {
            store,
            embedder,
            llm,
            model: model.into(),
            profile,
            prompts: PromptBuilder::new()?,
            limits: RetrievalLimits::default(),
        })
    }

    /// Override the per-intent retrieval limits.
    pub fn with_limits(mut self, limits: RetrievalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The schema profile currently in use.
    pub fn profile(&self) -> &TableProfile {
        &self.profile
    }

    /// Re-run schema probing against the same table.
    ///
    /// The profile is otherwise fixed for the assistant's lifetime; call
    /// this if the knowledge-base schema is known to have changed.
    pub async fn reprobe(&mut self) {
        self.profile = profile::probe(self.store.as_ref(), &self.profile.table).await;
    }

    /// Answer a business question.
    ///
    /// Always returns a result: blank input short-circuits with a fixed
    /// message and no external calls, and every downstream failure is
    /// folded into the response text.
    pub async fn ask(&self, question: &str) -> AnswerResult {
        if question.trim().is_empty() {
            tracing::debug!("Blank question, returning fixed prompt-for-specificity result");
            return AnswerResult::prompt_for_question(question);
        }

        let intent = classify(question);
        let limit = self.limits.for_intent(intent);
        tracing::info!(intent = intent.as_str(), limit, "Classified question");

        let retriever = Retriever::new(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            self.profile.clone(),
        );
        let retrieved = retriever.retrieve(question, limit).await;

        let context = context::assemble(&retrieved.documents, &self.profile);
        tracing::debug!(
            documents = retrieved.documents.len(),
            context_chars = context.len(),
            "Assembled context"
        );

        let prompt = match self.prompts.build(question, &context, intent) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!(error = %e, "Prompt construction failed");
                return AnswerResult::system_error(question, &e.to_string());
            }
        };

        let response = self.generate(&prompt).await;

        let sources: Vec<String> = retrieved
            .documents
            .iter()
            .map(|doc| self.profile.display_title(doc))
            .collect();

        AnswerResult::new(question, response, Some(intent), sources)
    }

    /// Single completion call. Failures are reported as answer text so
    /// the orchestrator needs no separate error path for this stage.
    async fn generate(&self, prompt: &str) -> String {
        let request = LlmRequest::new(prompt, &self.model)
            .with_temperature(GENERATION_TEMPERATURE)
            .with_max_tokens(GENERATION_MAX_TOKENS);

        match self.llm.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                tracing::error!(error = %e, "Answer generation failed");
                format!(
                    "Error generating response: {}. Please check your API keys and try again.",
                    e
                )
            }
        }
    }
}
