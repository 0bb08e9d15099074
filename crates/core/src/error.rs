//! Error types for consult.
//!
//! This module defines a unified error enum covering all error categories
//! in the application: configuration, I/O, knowledge store access,
//! embedding generation, LLM calls, and serialization.

use thiserror::Error;

/// Unified error type for consult.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated. The answer
/// pipeline additionally contains most of these at its own boundary; see
/// `consult-knowledge`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Knowledge store errors (network, auth, malformed responses)
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
