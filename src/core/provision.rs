//! Database and container provisioning
//!
//! Both operations are idempotent: an existing resource yields a handle
//! without error. Anything the store reports other than "already exists"
//! propagates unchanged, including a container that exists with a
//! different partition key path.

use crate::adapters::database::{ContainerHandle, DatabaseHandle, DocumentStore};
use crate::domain::{HearthError, Result};

/// Ensure a database exists and return a handle to it
///
/// # Errors
///
/// Returns an error if the id is empty or the store fails.
pub async fn ensure_database<S: DocumentStore>(
    store: &S,
    database_id: &str,
) -> Result<DatabaseHandle> {
    if database_id.trim().is_empty() {
        return Err(HearthError::Validation(
            "database id cannot be empty".to_string(),
        ));
    }

    store.create_database_if_not_exists(database_id).await?;
    tracing::info!(database = %database_id, "Database ready");

    Ok(DatabaseHandle::new(database_id))
}

/// Ensure a container exists with the given partition key path
///
/// # Errors
///
/// Returns `CosmosDbError::PartitionKeyMismatch` if the container already
/// exists with another partition key path, and any other store failure
/// unchanged.
pub async fn ensure_container<S: DocumentStore>(
    store: &S,
    database: &DatabaseHandle,
    container_id: &str,
    partition_key_path: &str,
) -> Result<ContainerHandle> {
    if container_id.trim().is_empty() {
        return Err(HearthError::Validation(
            "container id cannot be empty".to_string(),
        ));
    }
    if !partition_key_path.starts_with('/') {
        return Err(HearthError::Validation(format!(
            "partition key path must start with '/', got '{partition_key_path}'"
        )));
    }

    store
        .create_container_if_not_exists(database.id(), container_id, partition_key_path)
        .await?;
    tracing::info!(
        database = %database.id(),
        container = %container_id,
        partition_key = %partition_key_path,
        "Container ready"
    );

    Ok(ContainerHandle::new(database, container_id, partition_key_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, StoreOperation};
    use crate::domain::ErrorKind;

    #[tokio::test]
    async fn test_ensure_twice_yields_equal_handles() {
        let store = InMemoryStore::new();

        let db1 = ensure_database(&store, "FamilyDatabase").await.unwrap();
        let db2 = ensure_database(&store, "FamilyDatabase").await.unwrap();
        assert_eq!(db1, db2);

        let c1 = ensure_container(&store, &db1, "FamilyContainer", "/LastName")
            .await
            .unwrap();
        let c2 = ensure_container(&store, &db2, "FamilyContainer", "/LastName")
            .await
            .unwrap();
        assert_eq!(c1, c2);
    }

    #[tokio::test]
    async fn test_mismatched_partition_key_surfaces() {
        let store = InMemoryStore::new();
        let db = ensure_database(&store, "FamilyDatabase").await.unwrap();
        ensure_container(&store, &db, "FamilyContainer", "/LastName")
            .await
            .unwrap();

        let err = ensure_container(&store, &db, "FamilyContainer", "/id")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = InMemoryStore::new();
        store.fail_next(StoreOperation::CreateDatabase, 403);

        let err = ensure_database(&store, "FamilyDatabase").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!store.has_database("FamilyDatabase"));
    }

    #[tokio::test]
    async fn test_empty_ids_rejected() {
        let store = InMemoryStore::new();
        assert!(ensure_database(&store, " ").await.is_err());

        let db = ensure_database(&store, "FamilyDatabase").await.unwrap();
        let err = ensure_container(&store, &db, "FamilyContainer", "LastName")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Programming);
    }
}
