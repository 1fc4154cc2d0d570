//! Document store integrations for Hearth.
//!
//! - [`database`] - The [`DocumentStore`](database::DocumentStore) contract
//!   the core is written against
//! - [`cosmosdb`] - Azure Cosmos DB implementation
//! - [`memory`] - In-process implementation used by tests and `demo --in-memory`
//!
//! # Cosmos DB
//!
//! ```rust,no_run
//! use hearth::adapters::cosmosdb::CosmosDbStore;
//! use hearth::config::{secret_string, CosmosDbConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CosmosDbConfig {
//!     endpoint: "https://account.documents.azure.com:443/".to_string(),
//!     key: secret_string("key".to_string()),
//!     ..CosmosDbConfig::default()
//! };
//!
//! let store = CosmosDbStore::new(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod cosmosdb;
pub mod database;
pub mod memory;
