//! Configuration management for Hearth.
//!
//! Hearth reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HEARTH_<SECTION>_<KEY>` overrides, plus `ENDPOINT_URI` / `PRIMARY_KEY`
//! - Defaults for everything except the endpoint and key
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hearth::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hearth.toml")?;
//! println!("Cosmos DB: {}", config.cosmosdb.endpoint);
//! println!("Container: {}", config.cosmosdb.container_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [cosmosdb]
//! endpoint = "https://your-account.documents.azure.com:443/"
//! key = "${HEARTH_COSMOSDB_KEY}"
//! database_name = "FamilyDatabase"
//! container_name = "FamilyContainer"
//! partition_key = "/LastName"
//!
//! [writer]
//! probe_strategy = "raw_stream"
//!
//! [query]
//! page_size = 100
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{config_from_env, load_config, read_config};
pub use schema::{
    ApplicationConfig, CosmosDbConfig, HearthConfig, LoggingConfig, ProbeStrategy, QueryConfig,
    WriterConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
