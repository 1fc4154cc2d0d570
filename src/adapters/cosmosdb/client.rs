//! Cosmos DB implementation of the document store
//!
//! [`CosmosDbStore`] talks to Azure Cosmos DB through `azure_data_cosmos`
//! using key authentication. SDK failures are mapped onto
//! [`CosmosDbError`] by HTTP status so callers see the service's
//! classification unchanged.

use crate::adapters::database::response::RawItemResponse;
use crate::adapters::database::traits::{
    ContainerHandle, DocumentStore, PageSource, QueryScope, ReadOutcome, ResultPage, WriteResponse,
};
use crate::config::CosmosDbConfig;
use crate::domain::{CosmosDbError, HearthError, PartitionedDocument, Result};
use async_trait::async_trait;
use azure_core::credentials::Secret;
use azure_core::http::headers::{HeaderName, Headers};
use azure_data_cosmos::clients::ContainerClient;
use azure_data_cosmos::models::{
    ContainerProperties, IndexingPolicy, PartitionKeyDefinition, PartitionKeyKind,
};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions, PartitionKey};
use futures::stream::{BoxStream, Peekable, StreamExt};
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const REQUEST_CHARGE: HeaderName = HeaderName::from_static("x-ms-request-charge");

/// Azure Cosmos DB document store
pub struct CosmosDbStore {
    client: CosmosClient,
    endpoint: String,
    database_name: String,
    request_timeout: Duration,
}

impl CosmosDbStore {
    /// Create a store from configuration
    ///
    /// No request is issued; use [`DocumentStore::test_connection`] to verify
    /// the endpoint and key.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK client cannot be built (e.g. an endpoint
    /// that is not a URL).
    pub fn new(config: &CosmosDbConfig) -> Result<Self> {
        use secrecy::ExposeSecret;

        let key_str: String = config.key.expose_secret().clone().into();
        let client = CosmosClient::with_key(
            &config.endpoint,
            Secret::new(key_str),
            Some(CosmosClientOptions::default()),
        )
        .map_err(|e| {
            HearthError::CosmosDb(CosmosDbError::ConnectionFailed(format!(
                "Failed to create Cosmos client: {e}"
            )))
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            database_name: config.database_name.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }

    /// Account endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn container_client(&self, container: &ContainerHandle) -> ContainerClient {
        self.client
            .database_client(container.database_id())
            .container_client(container.id())
    }

    async fn call<T>(
        &self,
        what: &str,
        request: impl Future<Output = azure_core::Result<T>>,
    ) -> std::result::Result<T, CallError> {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(CallError::Sdk(err)),
            Err(_) => Err(CallError::TimedOut(format!(
                "{what} did not complete within {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }
}

/// Failure of a single SDK call
enum CallError {
    Sdk(azure_core::Error),
    TimedOut(String),
}

impl CallError {
    fn status(&self) -> Option<u16> {
        match self {
            CallError::Sdk(err) => sdk_status(err),
            CallError::TimedOut(_) => None,
        }
    }

    fn into_error(self, context: &str) -> HearthError {
        match self {
            CallError::Sdk(err) => map_sdk_error(&err, context),
            CallError::TimedOut(message) => CosmosDbError::Timeout(message).into(),
        }
    }
}

/// HTTP status carried by an SDK error, if any
fn sdk_status(err: &azure_core::Error) -> Option<u16> {
    err.http_status().map(u16::from)
}

/// Maps an SDK error onto the store error taxonomy
fn map_sdk_error(err: &azure_core::Error, context: &str) -> HearthError {
    let message = format!("{context}: {err}");
    let mapped = match sdk_status(err) {
        Some(status) => CosmosDbError::from_status(status, message),
        None => match err.kind() {
            azure_core::error::ErrorKind::DataConversion => {
                CosmosDbError::DeserializationFailed(message)
            }
            azure_core::error::ErrorKind::Credential => CosmosDbError::AuthenticationFailed {
                status: None,
                message,
            },
            _ => CosmosDbError::ConnectionFailed(message),
        },
    };
    mapped.into()
}

fn request_charge(headers: &Headers) -> f64 {
    parse_request_charge(headers.get_optional_str(&REQUEST_CHARGE))
}

/// Parses the `x-ms-request-charge` header; absent or malformed is 0
fn parse_request_charge(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn partition_key(value: &str) -> PartitionKey {
    PartitionKey::from(value.to_string())
}

#[async_trait]
impl DocumentStore for CosmosDbStore {
    async fn test_connection(&self) -> Result<()> {
        let database = self.client.database_client(&self.database_name);
        match self.call("database read", database.read(None)).await {
            Ok(_) => Ok(()),
            // Reachable and authorized, just not provisioned yet
            Err(err) if err.status() == Some(404) => Ok(()),
            Err(err) => Err(err.into_error("Connection test failed")),
        }
    }

    async fn create_database_if_not_exists(&self, database_id: &str) -> Result<()> {
        let database = self.client.database_client(database_id);
        match self.call("database read", database.read(None)).await {
            Ok(_) => {
                tracing::debug!(database = %database_id, "Database already exists");
                return Ok(());
            }
            Err(err) if err.status() == Some(404) => {}
            Err(err) => return Err(err.into_error("Failed to read database")),
        }

        match self
            .call("database create", self.client.create_database(database_id, None))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.status() == Some(409) => {
                tracing::debug!(database = %database_id, "Database created concurrently");
                Ok(())
            }
            Err(err) => Err(err.into_error("Failed to create database")),
        }
    }

    async fn create_container_if_not_exists(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<()> {
        let database = self.client.database_client(database_id);
        let container = database.container_client(container_id);

        match self.call("container read", container.read(None)).await {
            Ok(response) => {
                let properties = response.into_body().map_err(|e| {
                    HearthError::CosmosDb(CosmosDbError::DeserializationFailed(format!(
                        "Failed to read container properties: {e}"
                    )))
                })?;
                return check_partition_key_paths(
                    container_id,
                    &properties.partition_key.paths,
                    partition_key_path,
                );
            }
            Err(err) if err.status() == Some(404) => {}
            Err(err) => return Err(err.into_error("Failed to read container")),
        }

        let properties = ContainerProperties {
            id: Cow::Owned(container_id.to_string()),
            partition_key: PartitionKeyDefinition {
                paths: vec![partition_key_path.to_string()],
                kind: PartitionKeyKind::Hash,
                version: None,
            },
            indexing_policy: Some(IndexingPolicy::default()),
            ..Default::default()
        };

        match self
            .call("container create", database.create_container(properties, None))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.status() == Some(409) => {
                tracing::debug!(container = %container_id, "Container created concurrently");
                Ok(())
            }
            Err(err) => Err(err.into_error("Failed to create container")),
        }
    }

    async fn read_item<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key_value: &str,
    ) -> Result<ReadOutcome<T>> {
        let client = self.container_client(container);
        let request = client.read_item::<T>(partition_key(partition_key_value), id, None);

        match self.call("point read", request).await {
            Ok(response) => {
                let item = response.into_body().map_err(|e| {
                    HearthError::CosmosDb(CosmosDbError::DeserializationFailed(format!(
                        "Failed to deserialize item {id}: {e}"
                    )))
                })?;
                Ok(ReadOutcome::Found(item))
            }
            Err(err) if err.status() == Some(404) => Ok(ReadOutcome::NotFound),
            Err(err) => Err(err.into_error("Point read failed")),
        }
    }

    async fn read_item_raw<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key_value: &str,
    ) -> Result<RawItemResponse<T>> {
        let client = self.container_client(container);
        let request = client.read_item::<T>(partition_key(partition_key_value), id, None);

        match self.call("point read", request).await {
            Ok(response) => {
                let charge = request_charge(response.headers());
                let id = id.to_string();
                // The body stays undecoded until the caller asks for it
                Ok(RawItemResponse::found(charge, move || {
                    response.into_body().map_err(|e| {
                        HearthError::CosmosDb(CosmosDbError::DeserializationFailed(format!(
                            "Failed to deserialize item {id}: {e}"
                        )))
                    })
                }))
            }
            Err(err) => match err.status() {
                Some(status) => {
                    let message = match &err {
                        CallError::Sdk(sdk) => sdk.to_string(),
                        CallError::TimedOut(message) => message.clone(),
                    };
                    Ok(RawItemResponse::status_only(status, 0.0, message))
                }
                None => Err(err.into_error("Point read failed")),
            },
        }
    }

    async fn create_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        partition_key_value: &str,
    ) -> Result<WriteResponse<T>> {
        let client = self.container_client(container);
        let request = client.create_item(partition_key(partition_key_value), item.clone(), None);

        let response = self
            .call("create", request)
            .await
            .map_err(|e| e.into_error("Failed to create item"))?;

        Ok(WriteResponse {
            resource: item.clone(),
            request_charge: request_charge(response.headers()),
        })
    }

    async fn replace_item<T: PartitionedDocument + Clone + 'static>(
        &self,
        container: &ContainerHandle,
        item: &T,
        id: &str,
        partition_key_value: &str,
    ) -> Result<WriteResponse<T>> {
        let client = self.container_client(container);
        let request =
            client.replace_item(partition_key(partition_key_value), id, item.clone(), None);

        let response = self
            .call("replace", request)
            .await
            .map_err(|e| e.into_error("Failed to replace item"))?;

        Ok(WriteResponse {
            resource: item.clone(),
            request_charge: request_charge(response.headers()),
        })
    }

    async fn delete_item(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key_value: &str,
    ) -> Result<()> {
        let client = self.container_client(container);
        let request = client.delete_item(partition_key(partition_key_value), id, None);

        self.call("delete", request)
            .await
            .map_err(|e| e.into_error("Failed to delete item"))?;
        Ok(())
    }

    fn query_items<T: PartitionedDocument + 'static>(
        &self,
        container: &ContainerHandle,
        query: &str,
        scope: &QueryScope,
        page_size: usize,
    ) -> Result<Box<dyn PageSource<T>>> {
        let client = self.container_client(container);
        let pager = match scope {
            QueryScope::CrossPartition => client.query_items::<T>(query.to_string(), (), None),
            QueryScope::Partition(value) => {
                client.query_items::<T>(query.to_string(), partition_key(value.as_str()), None)
            }
        }
        .map_err(|e| map_sdk_error(&e, "Failed to create query"))?;

        Ok(Box::new(CosmosPageSource {
            items: pager.boxed().peekable(),
            page_size: page_size.max(1),
        }))
    }

    async fn delete_database(&self, database_id: &str) -> Result<()> {
        let database = self.client.database_client(database_id);
        self.call("database delete", database.delete(None))
            .await
            .map_err(|e| e.into_error("Failed to delete database"))?;
        Ok(())
    }
}

fn check_partition_key_paths(
    container_id: &str,
    existing: &[String],
    requested: &str,
) -> Result<()> {
    if existing.len() == 1 && existing[0] == requested {
        Ok(())
    } else {
        Err(CosmosDbError::PartitionKeyMismatch(format!(
            "container {container_id} is partitioned on {existing:?}, requested {requested}"
        ))
        .into())
    }
}

/// Cuts the SDK item stream into pages of at most `page_size` items
struct CosmosPageSource<T> {
    items: Peekable<BoxStream<'static, azure_core::Result<T>>>,
    page_size: usize,
}

#[async_trait]
impl<T: PartitionedDocument + 'static> PageSource<T> for CosmosPageSource<T> {
    async fn next_page(&mut self) -> Result<ResultPage<T>> {
        let mut items = Vec::with_capacity(self.page_size);
        while items.len() < self.page_size {
            match self.items.next().await {
                Some(Ok(item)) => items.push(item),
                Some(Err(e)) => return Err(map_sdk_error(&e, "Query failed")),
                None => break,
            }
        }
        let has_more = Pin::new(&mut self.items).peek().await.is_some();

        Ok(ResultPage {
            items,
            has_more,
            request_charge: 0.0,
        })
    }
}
