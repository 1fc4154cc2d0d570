//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Hearth configuration file.

use super::{exit_code_for, EXIT_CONFIG, EXIT_CONNECTION, EXIT_SUCCESS};
use crate::adapters::database::{create_document_store, DocumentStore};
use crate::config::{load_config, HearthConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also check that the account is reachable with the configured key
    #[arg(long)]
    pub check_connection: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("Configuration is valid");
        println!();
        print_summary(&config);

        if !self.check_connection {
            return Ok(EXIT_SUCCESS);
        }

        let store = match create_document_store(&config) {
            Ok(store) => store,
            Err(e) => {
                println!("Failed to create Cosmos DB client");
                println!("   Error: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };
        match store.test_connection().await {
            Ok(()) => {
                println!("Connected to {}", store.endpoint());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Connection test failed");
                println!("Connection test failed");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

fn print_summary(config: &HearthConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Cosmos DB Endpoint: {}", config.cosmosdb.endpoint);
    println!("  Key: {}", config.cosmosdb.key.expose_secret().masked());
    println!("  Database: {}", config.cosmosdb.database_name);
    println!("  Container: {}", config.cosmosdb.container_name);
    println!("  Partition Key: {}", config.cosmosdb.partition_key);
    println!(
        "  Request Timeout: {}s",
        config.cosmosdb.request_timeout_seconds
    );
    println!("  Probe Strategy: {}", config.writer.probe_strategy);
    println!("  Page Size: {}", config.query.page_size);
    println!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
        } else {
            "disabled".to_string()
        }
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(
            &path,
            r#"
[cosmosdb]
endpoint = "https://localhost:8081/"
key = "dGVzdA=="
"#,
        )
        .unwrap();

        let code = ValidateArgs {
            check_connection: false,
        }
        .execute(path.to_str().unwrap())
        .await
        .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_rejects_http_remote_endpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(
            &path,
            r#"
[cosmosdb]
endpoint = "http://account.documents.azure.com:443/"
key = "dGVzdA=="
"#,
        )
        .unwrap();

        let code = ValidateArgs {
            check_connection: false,
        }
        .execute(path.to_str().unwrap())
        .await
        .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
