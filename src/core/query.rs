//! Query runner
//!
//! Runs query text against a container and flattens the result pages into
//! one stream of documents, in the order the store returns them. The next
//! page is only requested after the previous page reported `has_more`.
//! Nothing is filtered, sorted or cached locally; re-running the query
//! starts over from the first page.

use crate::adapters::database::{ContainerHandle, DocumentStore, PageSource, QueryScope};
use crate::domain::{Family, HearthError, PartitionedDocument, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

/// Stream of documents produced by [`query`]
pub type DocumentStream<T> = BoxStream<'static, Result<T>>;

/// Stream of families
pub type FamilyStream = DocumentStream<Family>;

enum Cursor<T> {
    Start(Result<Box<dyn PageSource<T>>>),
    More(Box<dyn PageSource<T>>),
    Done,
}

/// Start a query; pages are fetched as the stream is polled
///
/// A malformed query surfaces as the stream's first item.
pub fn query<S, T>(
    store: &S,
    container: &ContainerHandle,
    query_text: &str,
    scope: &QueryScope,
    page_size: usize,
) -> DocumentStream<T>
where
    S: DocumentStore,
    T: PartitionedDocument + 'static,
{
    tracing::info!(
        container = %container.id(),
        query = %query_text,
        scope = ?scope,
        "Running query"
    );

    let source = store.query_items::<T>(container, query_text, scope, page_size);

    let pages = stream::try_unfold(Cursor::Start(source), |cursor| async move {
        let mut source = match cursor {
            Cursor::Start(source) => source?,
            Cursor::More(source) => source,
            Cursor::Done => return Ok(None),
        };

        let page = source.next_page().await?;
        tracing::debug!(
            items = page.items.len(),
            has_more = page.has_more,
            request_charge = page.request_charge,
            "Fetched query page"
        );

        let next = if page.has_more {
            Cursor::More(source)
        } else {
            Cursor::Done
        };
        Ok::<_, HearthError>(Some((page.items, next)))
    });

    pages
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
}

/// Run a query and collect every document
///
/// # Errors
///
/// Returns the first error produced by the store, including a rejected
/// query.
pub async fn query_all<S, T>(
    store: &S,
    container: &ContainerHandle,
    query_text: &str,
    scope: &QueryScope,
    page_size: usize,
) -> Result<Vec<T>>
where
    S: DocumentStore,
    T: PartitionedDocument + 'static,
{
    query(store, container, query_text, scope, page_size)
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::DatabaseHandle;
    use crate::adapters::memory::{InMemoryStore, StoreOperation};
    use crate::domain::{seed, ErrorKind, PartitionKeyValue};

    async fn seeded(count: usize) -> (InMemoryStore, ContainerHandle) {
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

        for n in 0..count {
            let mut family = seed::andersen_family();
            family.id = format!("Andersen.{n}");
            store
                .create_item(&container, &family, "Andersen")
                .await
                .unwrap();
        }
        store
            .create_item(&container, &seed::wakefield_family(), "Wakefield")
            .await
            .unwrap();
        (store, container)
    }

    #[tokio::test]
    async fn test_flattens_pages_in_order() {
        let (store, container) = seeded(5).await;

        let families: Vec<Family> = query_all(
            &store,
            &container,
            "SELECT * FROM c WHERE c.LastName = 'Andersen'",
            &QueryScope::CrossPartition,
            2,
        )
        .await
        .unwrap();

        let ids: Vec<&str> = families.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["Andersen.0", "Andersen.1", "Andersen.2", "Andersen.3", "Andersen.4"]);
        assert_eq!(store.page_requests(), 3);
    }

    #[tokio::test]
    async fn test_stops_after_last_page() {
        let (store, container) = seeded(2).await;

        let families: Vec<Family> =
            query_all(&store, &container, "", &QueryScope::CrossPartition, 10)
                .await
                .unwrap();

        assert_eq!(families.len(), 3);
        assert_eq!(store.page_requests(), 1);
    }

    #[tokio::test]
    async fn test_partition_scope() {
        let (store, container) = seeded(2).await;
        let scope = QueryScope::Partition(PartitionKeyValue::new("Wakefield").unwrap());

        let families: Vec<Family> = query_all(&store, &container, "", &scope, 10)
            .await
            .unwrap();

        assert_eq!(families.len(), 1);
        assert_eq!(families[0].id, "Wakefield.7");
    }

    #[tokio::test]
    async fn test_malformed_query_propagates() {
        let (store, container) = seeded(1).await;

        let err = query_all::<_, Family>(
            &store,
            &container,
            "LastName = ",
            &QueryScope::CrossPartition,
            10,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_page_failure_ends_stream_with_error() {
        let (store, container) = seeded(3).await;
        let mut stream: FamilyStream =
            query(&store, &container, "", &QueryScope::CrossPartition, 2);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_ok());

        store.fail_next(StoreOperation::Query, 429);
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(stream.next().await.is_none());
    }
}
