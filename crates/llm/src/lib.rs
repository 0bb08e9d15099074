//! Consult LLM Library
//!
//! Provider-agnostic client abstraction for generative language models.
//! The answer pipeline only ever issues single, stateless completion
//! calls; there is no streaming or conversation state here.

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
