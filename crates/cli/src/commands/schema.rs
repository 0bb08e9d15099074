//! Schema command handler.
//!
//! Probes the knowledge store and reports which table and fields the
//! pipeline would use, without touching any LLM provider.

use clap::Args;
use consult_core::{config::AppConfig, AppError, AppResult};
use consult_knowledge::{profile, PostgrestStore};

/// Inspect the probed knowledge-base schema
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output the profile as JSON
    #[arg(long)]
    pub json: bool,
}

impl SchemaCommand {
    /// Execute the schema command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing schema command");

        if config.store_url.trim().is_empty() {
            return Err(AppError::Config(
                "Knowledge store URL is not set (CONSULT_STORE_URL)".to_string(),
            ));
        }

        let store = PostgrestStore::new(&config.store_url, &config.store_key);
        let profile = profile::probe(&store, &config.table).await;

        if self.json {
            let json = serde_json::to_string_pretty(&profile)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        if !profile.available {
            println!("Table '{}' is unavailable; retrieval will be skipped.", config.table);
            return Ok(());
        }

        println!("Table: {}", profile.table);
        println!("Title fields: {}", join_or_none(&profile.title_fields));
        println!("Body fields: {}", join_or_none(&profile.body_fields));

        Ok(())
    }
}

fn join_or_none(fields: &[String]) -> String {
    if fields.is_empty() {
        "(none)".to_string()
    } else {
        fields.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(
            join_or_none(&["title".to_string(), "name".to_string()]),
            "title, name"
        );
    }
}
