//! Command handlers for the Consult CLI.

pub mod ask;
pub mod schema;

pub use ask::AskCommand;
pub use schema::SchemaCommand;
