//! Configuration management for consult.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - An optional YAML config file (consult.yaml)
//! - Command-line flags
//!
//! Precedence is CLI flags > environment variables > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Providers accepted for answer generation.
pub const KNOWN_PROVIDERS: &[&str] = &["gemini", "ollama"];

/// Providers accepted for query embeddings.
pub const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["ollama", "trigram"];

/// Main application configuration.
///
/// Holds everything needed to reach the knowledge store, the embedding
/// service, and the generative model. Startup fails fast when any of the
/// required pieces is missing (see [`AppConfig::validate`]); the only
/// initialization step allowed to degrade is schema probing, which lives
/// in `consult-knowledge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the knowledge store (PostgREST-style endpoint)
    pub store_url: String,

    /// API key for the knowledge store
    pub store_key: String,

    /// Primary table holding the document records
    pub table: String,

    /// Generative model provider ("gemini", "ollama")
    pub provider: String,

    /// Model identifier for answer generation
    pub model: String,

    /// Optional custom endpoint for the generative provider
    pub endpoint: Option<String>,

    /// API key for the generative provider (Gemini requires one)
    pub api_key: Option<String>,

    /// Embedding provider ("ollama", "trigram")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Optional custom endpoint for the embedding provider
    pub embedding_endpoint: Option<String>,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// On-disk configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    store: Option<StoreSection>,
    llm: Option<LlmSection>,
    embeddings: Option<EmbeddingsSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    url: Option<String>,
    key: Option<String>,
    table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingsSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            store_key: String::new(),
            table: "documents".to_string(),
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            endpoint: None,
            api_key: None,
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_endpoint: None,
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `CONSULT_STORE_URL`: Knowledge store base URL
    /// - `CONSULT_STORE_KEY`: Knowledge store API key
    /// - `CONSULT_TABLE`: Primary document table name
    /// - `CONSULT_PROVIDER`: Generative provider
    /// - `CONSULT_MODEL`: Model identifier
    /// - `CONSULT_ENDPOINT`: Custom provider endpoint
    /// - `CONSULT_API_KEY` / `GEMINI_API_KEY`: Provider API key
    /// - `CONSULT_EMBEDDING_PROVIDER`, `CONSULT_EMBEDDING_MODEL`,
    ///   `CONSULT_EMBEDDING_ENDPOINT`: Embedding service settings
    /// - `CONSULT_CONFIG`: Path to config file (default: ./consult.yaml)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("CONSULT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Merge the YAML config file if one exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("consult.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(url) = std::env::var("CONSULT_STORE_URL") {
            config.store_url = url;
        }

        if let Ok(key) = std::env::var("CONSULT_STORE_KEY") {
            config.store_key = key;
        }

        if let Ok(table) = std::env::var("CONSULT_TABLE") {
            config.table = table;
        }

        if let Ok(provider) = std::env::var("CONSULT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CONSULT_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("CONSULT_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        config.api_key = std::env::var("CONSULT_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();

        if let Ok(provider) = std::env::var("CONSULT_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Ok(model) = std::env::var("CONSULT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if let Ok(endpoint) = std::env::var("CONSULT_EMBEDDING_ENDPOINT") {
            config.embedding_endpoint = Some(endpoint);
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(store) = config_file.store {
            if let Some(url) = store.url {
                result.store_url = url;
            }
            if let Some(key) = store.key {
                result.store_key = key;
            }
            if let Some(table) = store.table {
                result.table = table;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
        }

        if let Some(embeddings) = config_file.embeddings {
            if let Some(provider) = embeddings.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embeddings.model {
                result.embedding_model = model;
            }
            if let Some(endpoint) = embeddings.endpoint {
                result.embedding_endpoint = Some(endpoint);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        table: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(table) = table {
            self.table = table;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration before serving queries.
    ///
    /// Missing store or model credentials are a startup failure: answers
    /// would be meaningless without them, so we refuse to serve rather
    /// than silently degrade.
    pub fn validate(&self) -> AppResult<()> {
        if self.store_url.trim().is_empty() {
            return Err(AppError::Config(
                "Knowledge store URL is not set (CONSULT_STORE_URL)".to_string(),
            ));
        }

        if !self.store_url.starts_with("http://") && !self.store_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Knowledge store URL must be http(s): {}",
                self.store_url
            )));
        }

        if self.store_key.trim().is_empty() {
            return Err(AppError::Config(
                "Knowledge store API key is not set (CONSULT_STORE_KEY)".to_string(),
            ));
        }

        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "gemini" && self.api_key.is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (CONSULT_API_KEY or GEMINI_API_KEY)"
                    .to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}
