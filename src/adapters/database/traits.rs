//! Document store abstraction traits
//!
//! This module defines the operations Hearth consumes from a document store.
//! Implementations handle transport concerns (connections, authentication,
//! TLS, transport-level retries); everything above this trait only sees
//! identities, documents and classified errors.

use crate::adapters::database::response::RawItemResponse;
use crate::domain::ids::PartitionKeyValue;
use crate::domain::{PartitionedDocument, Result};
use async_trait::async_trait;

/// Handle to a provisioned database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseHandle {
    id: String,
}

impl DatabaseHandle {
    /// Create a handle for a database id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Database id
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Handle to a provisioned container, bound to its partition key path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle {
    database_id: String,
    id: String,
    partition_key_path: String,
}

impl ContainerHandle {
    /// Create a handle for a container inside `database`
    pub fn new(
        database: &DatabaseHandle,
        id: impl Into<String>,
        partition_key_path: impl Into<String>,
    ) -> Self {
        Self {
            database_id: database.id().to_string(),
            id: id.into(),
            partition_key_path: partition_key_path.into(),
        }
    }

    /// Id of the owning database
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Container id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Partition key path the container was created with (e.g. `/LastName`)
    pub fn partition_key_path(&self) -> &str {
        &self.partition_key_path
    }
}

/// Outcome of a point read
///
/// Absence is an expected outcome, not an error: every other failure is
/// reported through the surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    /// The item exists
    Found(T),
    /// No item with this identity exists in the addressed partition
    NotFound,
}

impl<T> ReadOutcome<T> {
    /// Whether the item was found
    pub fn is_found(&self) -> bool {
        matches!(self, ReadOutcome::Found(_))
    }

    /// Converts into an `Option`
    pub fn into_option(self) -> Option<T> {
        match self {
            ReadOutcome::Found(item) => Some(item),
            ReadOutcome::NotFound => None,
        }
    }

    /// Maps the found value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Found(item) => ReadOutcome::Found(f(item)),
            ReadOutcome::NotFound => ReadOutcome::NotFound,
        }
    }
}

/// Response of a write (create or replace)
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResponse<T> {
    /// The document as written
    pub resource: T,

    /// Request units consumed by the operation
    pub request_charge: f64,
}

/// Scope a query executes in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryScope {
    /// Fan out over all partitions
    #[default]
    CrossPartition,
    /// Restrict to a single partition
    Partition(PartitionKeyValue),
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    /// Documents on this page, in store order
    pub items: Vec<T>,

    /// Whether the store has more pages after this one
    pub has_more: bool,

    /// Request units consumed fetching this page
    pub request_charge: f64,
}

/// Source of query result pages
///
/// Each call to [`PageSource::next_page`] issues one request; callers only
/// call it again while the previous page reported `has_more`.
#[async_trait]
pub trait PageSource<T>: Send {
    /// Fetch the next page
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the query (e.g. malformed query
    /// text) or the request fails.
    async fn next_page(&mut self) -> Result<ResultPage<T>>;
}

/// Document store trait
///
/// The operations here are the whole surface Hearth consumes. Status
/// classification of failures is preserved in the returned errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Test connectivity to the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create the database unless it already exists
    ///
    /// # Errors
    ///
    /// Returns any failure other than "already exists".
    async fn create_database_if_not_exists(&self, database_id: &str) -> Result<()>;

    /// Create the container unless it already exists
    ///
    /// # Errors
    ///
    /// Returns `CosmosDbError::PartitionKeyMismatch` if the container exists
    /// with a different partition key path, and any other failure unchanged.
    async fn create_container_if_not_exists(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<()>;

    /// Point read, deserializing the item
    ///
    /// # Errors
    ///
    /// Returns every failure except absence, which is `ReadOutcome::NotFound`.
    async fn read_item<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<ReadOutcome<T>>;

    /// Point read returning the raw response
    ///
    /// HTTP statuses, including failures, are reported through
    /// [`RawItemResponse::status`]; only failures without a status (e.g. the
    /// connection dropped) are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns failures that carry no HTTP status.
    async fn read_item_raw<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<RawItemResponse<T>>;

    /// Create an item
    ///
    /// # Errors
    ///
    /// Returns `CosmosDbError::Conflict` if the identity already exists.
    async fn create_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        partition_key: &str,
    ) -> Result<WriteResponse<T>>;

    /// Replace an item with a full new body
    ///
    /// # Errors
    ///
    /// Returns `CosmosDbError::NotFound` if the identity does not exist.
    async fn replace_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        id: &str,
        partition_key: &str,
    ) -> Result<WriteResponse<T>>;

    /// Delete an item
    ///
    /// # Errors
    ///
    /// Returns `CosmosDbError::NotFound` if the identity does not exist.
    async fn delete_item(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &str,
    ) -> Result<()>;

    /// Start a query; the query text is passed through unmodified
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be issued.
    fn query_items<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        query: &str,
        scope: &QueryScope,
        page_size: usize,
    ) -> Result<Box<dyn PageSource<T>>>;

    /// Delete a database and everything in it
    ///
    /// # Errors
    ///
    /// Returns `CosmosDbError::NotFound` if the database does not exist.
    async fn delete_database(&self, database_id: &str) -> Result<()>;
}
