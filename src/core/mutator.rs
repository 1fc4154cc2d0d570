//! Read-modify-replace updates
//!
//! An update reads the item, changes the in-memory copy and sends the whole
//! body back with a replace. No concurrency token is checked: a write made
//! by someone else between the read and the replace is overwritten
//! (last writer wins).

use crate::adapters::database::{ContainerHandle, DocumentStore, ReadOutcome};
use crate::domain::{CosmosDbError, Family, HearthError, ItemIdentity, PartitionedDocument, Result};

/// Read an item, apply `mutate` to it and replace it with the result
///
/// The closure may change any field except the identity.
///
/// # Errors
///
/// Returns `CosmosDbError::NotFound` if the item does not exist, any error
/// returned by `mutate`, a validation error if `mutate` changed the id or
/// partition key, and every store failure.
pub async fn read_modify_replace<S, T, F>(
    store: &S,
    container: &ContainerHandle,
    identity: &ItemIdentity,
    mutate: F,
) -> Result<T>
where
    S: DocumentStore,
    T: PartitionedDocument + Clone + 'static,
    F: FnOnce(&mut T) -> Result<()>,
{
    let mut document = match store
        .read_item::<T>(container, identity.id(), identity.partition_key())
        .await?
    {
        ReadOutcome::Found(document) => document,
        ReadOutcome::NotFound => {
            return Err(CosmosDbError::NotFound(format!("item {identity} does not exist")).into())
        }
    };

    mutate(&mut document)?;

    if document.id() != identity.id() || document.partition_key() != identity.partition_key() {
        return Err(HearthError::Validation(format!(
            "update changed the identity of {identity} to [{},{}]",
            document.partition_key(),
            document.id()
        )));
    }

    let response = store
        .replace_item(container, &document, identity.id(), identity.partition_key())
        .await?;
    tracing::info!(
        id = %identity.id(),
        partition_key = %identity.partition_key(),
        request_charge = response.request_charge,
        "Replaced item"
    );

    Ok(response.resource)
}

/// Set a family's registration flag and one child's grade
///
/// # Errors
///
/// Returns `HearthError::ChildIndexOutOfRange` (before any replace is sent)
/// if the family has no child at `child_index`, `CosmosDbError::NotFound`
/// if the family does not exist, and every store failure.
pub async fn update_registration_and_grade<S: DocumentStore>(
    store: &S,
    container: &ContainerHandle,
    id: &str,
    partition_key: &str,
    is_registered: bool,
    child_index: usize,
    grade: i32,
) -> Result<Family> {
    let identity = ItemIdentity::new(id, partition_key).map_err(HearthError::Validation)?;

    let updated = read_modify_replace(store, container, &identity, |family: &mut Family| {
        let len = family.children.len();
        match family.children.get_mut(child_index) {
            Some(child) => child.grade = grade,
            None => {
                return Err(HearthError::ChildIndexOutOfRange {
                    id: family.id.clone(),
                    index: child_index,
                    len,
                })
            }
        }
        family.is_registered = is_registered;
        Ok(())
    })
    .await?;

    tracing::debug!(body = %updated, "Updated family body");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::DatabaseHandle;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::{seed, ErrorKind};

    async fn with_family(family: &Family) -> (InMemoryStore, ContainerHandle) {
        let store = InMemoryStore::new();
        store
            .create_database_if_not_exists("FamilyDatabase")
            .await
            .unwrap();
        store
            .create_container_if_not_exists("FamilyDatabase", "FamilyContainer", "/LastName")
            .await
            .unwrap();
        let db = DatabaseHandle::new("FamilyDatabase");
        let container = ContainerHandle::new(&db, "FamilyContainer", "/LastName");
        store
            .create_item(&container, family, &family.last_name)
            .await
            .unwrap();
        (store, container)
    }

    #[tokio::test]
    async fn test_update_changes_only_target_fields() {
        let original = seed::andersen_family();
        let (store, container) = with_family(&original).await;

        let updated =
            update_registration_and_grade(&store, &container, "Andersen.1", "Andersen", true, 0, 6)
                .await
                .unwrap();

        let mut expected = original.clone();
        expected.is_registered = true;
        expected.children[0].grade = 6;
        assert_eq!(updated, expected);

        let stored: Family = store
            .read_item(&container, "Andersen.1", "Andersen")
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_invalid_child_index_fails_without_replace() {
        let (store, container) = with_family(&seed::andersen_family()).await;

        let err =
            update_registration_and_grade(&store, &container, "Andersen.1", "Andersen", true, 3, 6)
                .await
                .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Programming);
        assert!(matches!(
            err,
            HearthError::ChildIndexOutOfRange { index: 3, len: 1, .. }
        ));
        assert_eq!(store.replace_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_children_fails_fast() {
        let mut family = seed::andersen_family();
        family.children.clear();
        let (store, container) = with_family(&family).await;

        let err =
            update_registration_and_grade(&store, &container, "Andersen.1", "Andersen", true, 0, 6)
                .await
                .unwrap_err();
        assert!(matches!(err, HearthError::ChildIndexOutOfRange { len: 0, .. }));
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found() {
        let (store, container) = with_family(&seed::andersen_family()).await;

        let err = update_registration_and_grade(
            &store,
            &container,
            "Andersen.1",
            "Wakefield",
            true,
            0,
            6,
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_identity_change_is_rejected() {
        let (store, container) = with_family(&seed::andersen_family()).await;
        let identity = ItemIdentity::new("Andersen.1", "Andersen").unwrap();

        let err = read_modify_replace(&store, &container, &identity, |family: &mut Family| {
            family.last_name = "Andersson".to_string();
            Ok(())
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Programming);
        assert_eq!(store.replace_calls(), 0);
    }
}
