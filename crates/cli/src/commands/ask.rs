//! Ask command handler.
//!
//! Connects the answer pipeline, enhances the question from the CLI
//! options, and prints the result as text or JSON.

use clap::{Args, ValueEnum};
use consult_core::{config::AppConfig, AppResult};
use consult_knowledge::Assistant;

/// Urgency attached to the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Priority {
    Normal,
    High,
    Urgent,
}

impl Priority {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Ask a business question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Ask for technical implementation details
    #[arg(long)]
    pub technical: bool,

    /// Ask for detailed analysis with multiple options
    #[arg(long)]
    pub detailed: bool,

    /// Question priority
    #[arg(long, value_enum, default_value = "normal")]
    pub priority: Priority,

    /// Output the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.enhanced_question();
        tracing::debug!("Question: {}", question);

        let assistant = Assistant::connect(config).await?;
        let result = assistant.ask(&question).await;

        if self.json {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| consult_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", result.response);

            if result.source_count > 0 {
                println!();
                println!("Sources:");
                for (i, source) in result.sources.iter().enumerate() {
                    println!("  {}. {}", i + 1, source);
                }
            }

            if let Some(intent) = result.query_intent {
                tracing::debug!("Query intent: {}", intent.as_str());
            }
        }

        Ok(())
    }

    /// Join the positional words and append the option-driven suffixes.
    fn enhanced_question(&self) -> String {
        let mut question = self.question.join(" ");

        if self.technical {
            question.push_str(" Include technical implementation details.");
        }

        if self.detailed {
            question.push_str(" Provide detailed analysis and multiple options.");
        }

        if matches!(self.priority, Priority::High | Priority::Urgent) {
            question.push_str(&format!(
                " This is {} priority - provide immediate actionable steps.",
                self.priority.as_str()
            ));
        }

        question
    }
}
