//! Item and database deletion

use crate::adapters::database::{ContainerHandle, DatabaseHandle, DocumentStore};
use crate::domain::{HearthError, ItemIdentity, Result};

/// Delete one item
///
/// # Errors
///
/// Returns `CosmosDbError::NotFound` if no item has this identity in the
/// addressed partition, and every other store failure.
pub async fn delete_item<S: DocumentStore>(
    store: &S,
    container: &ContainerHandle,
    id: &str,
    partition_key: &str,
) -> Result<()> {
    let identity = ItemIdentity::new(id, partition_key).map_err(HearthError::Validation)?;

    store
        .delete_item(container, identity.id(), identity.partition_key())
        .await?;
    tracing::info!(
        id = %identity.id(),
        partition_key = %identity.partition_key(),
        "Deleted item"
    );
    Ok(())
}

/// Delete a database and everything in it
///
/// Takes the handle by value; sessions call this from
/// [`FamilySession::delete_database_and_close`](super::session::FamilySession::delete_database_and_close).
///
/// # Errors
///
/// Returns `CosmosDbError::NotFound` if the database does not exist.
pub async fn delete_database<S: DocumentStore>(store: &S, database: DatabaseHandle) -> Result<()> {
    store.delete_database(database.id()).await?;
    tracing::info!(database = %database.id(), "Deleted database");
    Ok(())
}
