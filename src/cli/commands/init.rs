//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

const SAMPLE_CONFIG: &str = r#"# Hearth Configuration File
# Family document store client for Azure Cosmos DB

[application]
log_level = "info"

[cosmosdb]
# The local emulator listens on https://localhost:8081/
endpoint = "https://your-account.documents.azure.com:443/"
key = "${HEARTH_COSMOSDB_KEY}"
database_name = "FamilyDatabase"
container_name = "FamilyContainer"
partition_key = "/LastName"
request_timeout_seconds = 30

[writer]
# typed | raw_stream
probe_strategy = "raw_stream"

[query]
page_size = 100

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "hearth.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your account endpoint", self.output);
                println!("  2. Set HEARTH_COSMOSDB_KEY (or PRIMARY_KEY) in your environment or .env");
                println!("  3. Validate configuration: hearth validate-config");
                println!("  4. Run the walkthrough: hearth demo");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
