//! Document store factory
//!
//! Builds the configured remote store. The in-memory store needs no
//! configuration and is constructed directly with
//! [`InMemoryStore::new`](crate::adapters::memory::InMemoryStore::new).

use crate::adapters::cosmosdb::CosmosDbStore;
use crate::config::schema::HearthConfig;
use crate::domain::Result;

/// Create the Cosmos DB store described by the configuration
///
/// # Errors
///
/// Returns an error if the SDK client cannot be created.
pub fn create_document_store(config: &HearthConfig) -> Result<CosmosDbStore> {
    tracing::info!(
        endpoint = %config.cosmosdb.endpoint,
        database = %config.cosmosdb.database_name,
        "Creating Cosmos DB client"
    );
    CosmosDbStore::new(&config.cosmosdb)
}
