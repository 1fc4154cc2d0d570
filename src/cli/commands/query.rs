//! Query command implementation

use super::{exit_code_for, EXIT_CONFIG, EXIT_CONNECTION, EXIT_SUCCESS};
use crate::adapters::database::{create_document_store, DocumentStore, QueryScope};
use crate::config::load_config;
use crate::core::{FamilySession, SessionSettings};
use crate::domain::{PartitionKeyValue, Result};
use clap::Args;
use futures::StreamExt;

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query text, e.g. "SELECT * FROM c WHERE c.LastName = 'Andersen'"
    pub query: String,

    /// Restrict the query to one partition
    #[arg(long, value_name = "VALUE")]
    pub partition_key: Option<String>,
}

impl QueryArgs {
    /// Execute the query command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let scope = match self.scope() {
            Ok(scope) => scope,
            Err(e) => {
                eprintln!("Invalid partition key: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_document_store(&config) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Failed to connect: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };

        match self.run(store, &SessionSettings::from(&config), &scope).await {
            Ok(count) => {
                tracing::info!(count, "Query complete");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Query failed");
                eprintln!("Query failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn scope(&self) -> std::result::Result<QueryScope, String> {
        match &self.partition_key {
            Some(value) => Ok(QueryScope::Partition(PartitionKeyValue::new(value.clone())?)),
            None => Ok(QueryScope::CrossPartition),
        }
    }

    /// Prints each document on its own line, returning how many were printed
    async fn run<S: DocumentStore>(
        &self,
        store: S,
        settings: &SessionSettings,
        scope: &QueryScope,
    ) -> Result<usize> {
        let session = FamilySession::open(store, settings).await?;
        let mut stream = session.query(&self.query, scope);

        let mut count = 0;
        while let Some(family) = stream.next().await {
            println!("{}", serde_json::to_string_pretty(&family?)?);
            count += 1;
        }
        session.close();

        Ok(count)
    }
}
