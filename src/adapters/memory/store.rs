//! In-memory document store
//!
//! A process-local [`DocumentStore`] that enforces the same contract as the
//! service: items are routed by the value at the container's partition key
//! path, `(id, partition key)` is unique, writes whose body disagrees with
//! the supplied partition key are rejected, and queries are paginated.
//!
//! It also counts raw responses opened and released, and can be told to fail
//! the next call of an operation with a given status.

use super::predicate::Predicate;
use crate::adapters::database::response::RawItemResponse;
use crate::adapters::database::traits::{
    ContainerHandle, DocumentStore, PageSource, QueryScope, ReadOutcome, ResultPage, WriteResponse,
};
use crate::domain::{CosmosDbError, PartitionedDocument, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const READ_CHARGE: f64 = 1.0;
const WRITE_CHARGE: f64 = 5.71;
const QUERY_PAGE_CHARGE: f64 = 2.83;

/// Store operation, used to target injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Database creation
    CreateDatabase,
    /// Container creation
    CreateContainer,
    /// Point reads, typed or raw
    Read,
    /// Item creation
    Create,
    /// Item replacement
    Replace,
    /// Item deletion
    Delete,
    /// Query page fetches
    Query,
    /// Database deletion
    DeleteDatabase,
}

#[derive(Debug, Clone)]
struct StoredItem {
    id: String,
    partition_key: String,
    body: Value,
}

#[derive(Debug)]
struct ContainerState {
    partition_key_path: String,
    items: Vec<StoredItem>,
}

impl ContainerState {
    fn position(&self, id: &str, partition_key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.id == id && item.partition_key == partition_key)
    }
}

#[derive(Debug, Default)]
struct DatabaseState {
    containers: HashMap<String, ContainerState>,
}

#[derive(Default)]
struct Counters {
    raw_opened: AtomicUsize,
    raw_released: AtomicUsize,
    creates: AtomicUsize,
    replaces: AtomicUsize,
    page_requests: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    databases: RwLock<HashMap<String, DatabaseState>>,
    faults: Mutex<Vec<(StoreOperation, u16)>>,
    counters: Counters,
}

/// In-memory implementation of [`DocumentStore`]
///
/// Cloning is cheap; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call of `operation` with `status`
    pub fn fail_next(&self, operation: StoreOperation, status: u16) {
        self.inner.faults.lock().push((operation, status));
    }

    /// Number of raw responses handed out by `read_item_raw`
    pub fn raw_responses_opened(&self) -> usize {
        self.inner.counters.raw_opened.load(Ordering::SeqCst)
    }

    /// Number of raw responses whose resource has been released
    pub fn raw_responses_released(&self) -> usize {
        self.inner.counters.raw_released.load(Ordering::SeqCst)
    }

    /// Number of create calls received, successful or not
    pub fn create_calls(&self) -> usize {
        self.inner.counters.creates.load(Ordering::SeqCst)
    }

    /// Number of replace calls received, successful or not
    pub fn replace_calls(&self) -> usize {
        self.inner.counters.replaces.load(Ordering::SeqCst)
    }

    /// Number of query pages requested
    pub fn page_requests(&self) -> usize {
        self.inner.counters.page_requests.load(Ordering::SeqCst)
    }

    /// Whether a database exists
    pub fn has_database(&self, database_id: &str) -> bool {
        self.inner.databases.read().contains_key(database_id)
    }

    /// Stored body of an item, bypassing the typed API
    pub fn stored_body(&self, container: &ContainerHandle, id: &str, partition_key: &str) -> Option<Value> {
        self.lookup_body(container, id, partition_key).ok().flatten()
    }

    fn take_fault(&self, operation: StoreOperation) -> Option<u16> {
        let mut faults = self.inner.faults.lock();
        let index = faults.iter().position(|(op, _)| *op == operation)?;
        Some(faults.remove(index).1)
    }

    fn check_fault(&self, operation: StoreOperation) -> Result<()> {
        match self.take_fault(operation) {
            Some(status) => Err(CosmosDbError::from_status(
                status,
                format!("injected failure for {operation:?}"),
            )
            .into()),
            None => Ok(()),
        }
    }

    fn with_container<R>(
        &self,
        container: &ContainerHandle,
        f: impl FnOnce(&ContainerState) -> Result<R>,
    ) -> Result<R> {
        let databases = self.inner.databases.read();
        let state = lookup_container(&databases, container)?;
        f(state)
    }

    fn with_container_mut<R>(
        &self,
        container: &ContainerHandle,
        f: impl FnOnce(&mut ContainerState) -> Result<R>,
    ) -> Result<R> {
        let mut databases = self.inner.databases.write();
        let database = databases.get_mut(container.database_id()).ok_or_else(|| {
            CosmosDbError::NotFound(format!("database {}", container.database_id()))
        })?;
        let state = database
            .containers
            .get_mut(container.id())
            .ok_or_else(|| CosmosDbError::NotFound(format!("container {}", container.id())))?;
        f(state)
    }

    fn lookup_body(&self, container: &ContainerHandle, id: &str, partition_key: &str) -> Result<Option<Value>> {
        self.with_container(container, |state| {
            Ok(state
                .position(id, partition_key)
                .map(|index| state.items[index].body.clone()))
        })
    }
}

fn lookup_container<'a>(
    databases: &'a HashMap<String, DatabaseState>,
    container: &ContainerHandle,
) -> Result<&'a ContainerState> {
    let database = databases
        .get(container.database_id())
        .ok_or_else(|| CosmosDbError::NotFound(format!("database {}", container.database_id())))?;
    database
        .containers
        .get(container.id())
        .ok_or_else(|| CosmosDbError::NotFound(format!("container {}", container.id())).into())
}

/// Resolves a partition key path such as `/LastName` against a document body
fn extract_partition_key(body: &Value, path: &str) -> Option<String> {
    let value = path
        .trim_start_matches('/')
        .split('/')
        .try_fold(body, |value, segment| value.get(segment))?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn to_body<T: PartitionedDocument>(item: &T) -> Result<Value> {
    serde_json::to_value(item)
        .map_err(|e| CosmosDbError::InvalidRequest(format!("item does not serialize: {e}")).into())
}

fn from_body<T: PartitionedDocument>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| CosmosDbError::DeserializationFailed(e.to_string()).into())
}

/// Checks that a body belongs at `(id, partition_key)` in `state`
fn check_body_identity(
    state: &ContainerState,
    body: &Value,
    id: &str,
    partition_key: &str,
) -> Result<()> {
    let body_id = body.get("id").and_then(Value::as_str);
    if body_id != Some(id) {
        return Err(CosmosDbError::InvalidRequest(format!(
            "document id {body_id:?} does not match request id {id}"
        ))
        .into());
    }
    let body_key = extract_partition_key(body, &state.partition_key_path);
    if body_key.as_deref() != Some(partition_key) {
        return Err(CosmosDbError::InvalidRequest(format!(
            "partition key extracted from document ({body_key:?}) does not match the one specified ({partition_key})"
        ))
        .into());
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn create_database_if_not_exists(&self, database_id: &str) -> Result<()> {
        self.check_fault(StoreOperation::CreateDatabase)?;
        self.inner
            .databases
            .write()
            .entry(database_id.to_string())
            .or_default();
        Ok(())
    }

    async fn create_container_if_not_exists(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<()> {
        self.check_fault(StoreOperation::CreateContainer)?;
        let mut databases = self.inner.databases.write();
        let database = databases
            .get_mut(database_id)
            .ok_or_else(|| CosmosDbError::NotFound(format!("database {database_id}")))?;

        match database.containers.get(container_id) {
            Some(existing) if existing.partition_key_path != partition_key_path => {
                Err(CosmosDbError::PartitionKeyMismatch(format!(
                    "container {container_id} is partitioned on {}, requested {partition_key_path}",
                    existing.partition_key_path
                ))
                .into())
            }
            Some(_) => Ok(()),
            None => {
                database.containers.insert(
                    container_id.to_string(),
                    ContainerState {
                        partition_key_path: partition_key_path.to_string(),
                        items: Vec::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn read_item<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<ReadOutcome<T>> {
        self.check_fault(StoreOperation::Read)?;
        match self.lookup_body(container, id, partition_key)? {
            Some(body) => Ok(ReadOutcome::Found(from_body(body)?)),
            None => Ok(ReadOutcome::NotFound),
        }
    }

    async fn read_item_raw<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<RawItemResponse<T>> {
        let response = match self.take_fault(StoreOperation::Read) {
            Some(status) => RawItemResponse::status_only(
                status,
                0.0,
                format!("injected failure for {:?}", StoreOperation::Read),
            ),
            None => match self.lookup_body(container, id, partition_key) {
                Ok(Some(body)) => RawItemResponse::found(READ_CHARGE, move || from_body(body)),
                Ok(None) => RawItemResponse::status_only(
                    404,
                    READ_CHARGE,
                    format!("item [{partition_key},{id}] not found"),
                ),
                // Missing database or container still has a status
                Err(err) => {
                    let status = err.status().unwrap_or(500);
                    RawItemResponse::status_only(status, 0.0, err.to_string())
                }
            },
        };

        self.inner.counters.raw_opened.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        Ok(response.with_release_hook(move || {
            inner.counters.raw_released.fetch_add(1, Ordering::SeqCst);
        }))
    }

    async fn create_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        partition_key: &str,
    ) -> Result<WriteResponse<T>> {
        self.inner.counters.creates.fetch_add(1, Ordering::SeqCst);
        self.check_fault(StoreOperation::Create)?;
        let body = to_body(item)?;

        self.with_container_mut(container, |state| {
            check_body_identity(state, &body, item.id(), partition_key)?;
            if state.position(item.id(), partition_key).is_some() {
                return Err(CosmosDbError::Conflict(format!(
                    "item [{partition_key},{}] already exists",
                    item.id()
                ))
                .into());
            }
            state.items.push(StoredItem {
                id: item.id().to_string(),
                partition_key: partition_key.to_string(),
                body,
            });
            Ok(())
        })?;

        Ok(WriteResponse {
            resource: item.clone(),
            request_charge: WRITE_CHARGE,
        })
    }

    async fn replace_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        id: &str,
        partition_key: &str,
    ) -> Result<WriteResponse<T>> {
        self.inner.counters.replaces.fetch_add(1, Ordering::SeqCst);
        self.check_fault(StoreOperation::Replace)?;
        let body = to_body(item)?;

        self.with_container_mut(container, |state| {
            let index = state.position(id, partition_key).ok_or_else(|| {
                CosmosDbError::NotFound(format!("item [{partition_key},{id}] not found"))
            })?;
            check_body_identity(state, &body, id, partition_key)?;
            state.items[index].body = body;
            Ok(())
        })?;

        Ok(WriteResponse {
            resource: item.clone(),
            request_charge: WRITE_CHARGE,
        })
    }

    async fn delete_item(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<()> {
        self.check_fault(StoreOperation::Delete)?;
        self.with_container_mut(container, |state| {
            let index = state.position(id, partition_key).ok_or_else(|| {
                CosmosDbError::NotFound(format!("item [{partition_key},{id}] not found"))
            })?;
            state.items.remove(index);
            Ok(())
        })
    }

    fn query_items<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        query: &str,
        scope: &QueryScope,
        page_size: usize,
    ) -> Result<Box<dyn PageSource<T>>> {
        Ok(Box::new(MemoryPageSource {
            store: self.clone(),
            container: container.clone(),
            query: query.to_string(),
            scope: scope.clone(),
            page_size: page_size.max(1),
            pending: None,
            _marker: PhantomData,
        }))
    }

    async fn delete_database(&self, database_id: &str) -> Result<()> {
        self.check_fault(StoreOperation::DeleteDatabase)?;
        match self.inner.databases.write().remove(database_id) {
            Some(_) => Ok(()),
            None => Err(CosmosDbError::NotFound(format!("database {database_id}")).into()),
        }
    }
}

/// Pages over the matches of one query
///
/// Matches are evaluated when the first page is requested and served from
/// that snapshot afterwards.
struct MemoryPageSource<T> {
    store: InMemoryStore,
    container: ContainerHandle,
    query: String,
    scope: QueryScope,
    page_size: usize,
    pending: Option<std::vec::IntoIter<Value>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryPageSource<T> {
    fn evaluate(&self) -> Result<Vec<Value>> {
        let predicate = Predicate::parse(&self.query)
            .map_err(|e| CosmosDbError::InvalidRequest(format!("syntax error in query: {e}")))?;
        self.store.with_container(&self.container, |state| {
            Ok(state
                .items
                .iter()
                .filter(|item| match &self.scope {
                    QueryScope::CrossPartition => true,
                    QueryScope::Partition(key) => item.partition_key == key.as_str(),
                })
                .filter(|item| predicate.matches(&item.body))
                .map(|item| item.body.clone())
                .collect())
        })
    }
}

#[async_trait]
impl<T: PartitionedDocument + 'static> PageSource<T> for MemoryPageSource<T> {
    async fn next_page(&mut self) -> Result<ResultPage<T>> {
        self.store
            .inner
            .counters
            .page_requests
            .fetch_add(1, Ordering::SeqCst);
        self.store.check_fault(StoreOperation::Query)?;

        let mut pending = match self.pending.take() {
            Some(pending) => pending,
            None => self.evaluate()?.into_iter(),
        };

        let items = pending
            .by_ref()
            .take(self.page_size)
            .map(from_body)
            .collect::<Result<Vec<T>>>()?;
        let has_more = pending.len() > 0;
        self.pending = Some(pending);

        Ok(ResultPage {
            items,
            has_more,
            request_charge: QUERY_PAGE_CHARGE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::traits::DatabaseHandle;
    use crate::domain::{seed, ErrorKind, Family};

    async fn provisioned() -> (InMemoryStore, ContainerHandle) {
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
        (store, ContainerHandle::new(&db, "FamilyContainer", "/LastName"))
    }

    #[test]
    fn test_extract_partition_key() {
        let body = serde_json::json!({ "LastName": "Andersen", "Address": { "State": "WA" } });
        assert_eq!(extract_partition_key(&body, "/LastName").as_deref(), Some("Andersen"));
        assert_eq!(extract_partition_key(&body, "/Address/State").as_deref(), Some("WA"));
        assert_eq!(extract_partition_key(&body, "/Missing"), None);
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let (store, container) = provisioned().await;
        let family = seed::andersen_family();

        store.create_item(&container, &family, "Andersen").await.unwrap();
        let read: ReadOutcome<Family> = store
            .read_item(&container, "Andersen.1", "Andersen")
            .await
            .unwrap();

        assert_eq!(read, ReadOutcome::Found(family));
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let (store, container) = provisioned().await;
        let family = seed::andersen_family();

        store.create_item(&container, &family, "Andersen").await.unwrap();
        let err = store
            .create_item(&container, &family, "Andersen")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_create_with_mismatched_partition_key_is_rejected() {
        let (store, container) = provisioned().await;
        let err = store
            .create_item(&container, &seed::andersen_family(), "Wakefield")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_container_partition_key_mismatch() {
        let (store, _) = provisioned().await;
        let err = store
            .create_container_if_not_exists("FamilyDatabase", "FamilyContainer", "/id")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_read_in_missing_container_is_not_found() {
        let store = InMemoryStore::new();
        let db = DatabaseHandle::new("nope");
        let container = ContainerHandle::new(&db, "nope", "/LastName");

        let err = store
            .read_item::<Family>(&container, "Andersen.1", "Andersen")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_fault_fires_once() {
        let (store, container) = provisioned().await;
        store.fail_next(StoreOperation::Read, 503);

        let first = store
            .read_item::<Family>(&container, "Andersen.1", "Andersen")
            .await;
        assert_eq!(first.unwrap_err().status(), Some(503));

        let second = store
            .read_item::<Family>(&container, "Andersen.1", "Andersen")
            .await
            .unwrap();
        assert_eq!(second, ReadOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_query_pages() {
        let (store, container) = provisioned().await;
        store
            .create_item(&container, &seed::andersen_family(), "Andersen")
            .await
            .unwrap();
        store
            .create_item(&container, &seed::wakefield_family(), "Wakefield")
            .await
            .unwrap();

        let mut pages = store
            .query_items::<Family>(&container, "SELECT * FROM c", &QueryScope::CrossPartition, 1)
            .unwrap();

        let first = pages.next_page().await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.has_more);

        let second = pages.next_page().await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more);
        assert_eq!(store.page_requests(), 2);
    }

    #[tokio::test]
    async fn test_malformed_query_fails_on_first_page() {
        let (store, container) = provisioned().await;
        let mut pages = store
            .query_items::<Family>(&container, "LastName ==", &QueryScope::CrossPartition, 10)
            .unwrap();

        let err = pages.next_page().await.unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}
