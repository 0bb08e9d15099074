//! Consult CLI
//!
//! Main entry point for the consult command-line tool.
//! Answers business questions from a retrieval-augmented knowledge base.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, SchemaCommand};
use consult_core::{config::AppConfig, logging, AppResult};

/// Consult - retrieval-augmented business question answering
#[derive(Parser, Debug)]
#[command(name = "consult")]
#[command(about = "Answer business questions from your knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "CONSULT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CONSULT_MODEL")]
    model: Option<String>,

    /// Document table to query
    #[arg(short, long, global = true, env = "CONSULT_TABLE")]
    table: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a business question
    Ask(AskCommand),

    /// Inspect the probed knowledge-base schema
    Schema(SchemaCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.table,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Consult CLI starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Table: {}", config.table);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Schema(_) => "schema",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Schema(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
