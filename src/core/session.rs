//! Family session
//!
//! A [`FamilySession`] owns a store and the handles provisioned through it.
//! It is the one value threaded through a walkthrough: open it, use it,
//! then either close it or delete the database and close it. Both consume
//! the session, so nothing borrowed from it can be used afterwards.

use super::{cleanup, mutator, provision, query, writer};
use crate::adapters::database::{
    ContainerHandle, DatabaseHandle, DocumentStore, QueryScope, ReadOutcome,
};
use crate::config::{HearthConfig, ProbeStrategy};
use crate::domain::{Family, PartitionedDocument, Result};
use writer::EnsureOutcome;

/// Settings a session is opened with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Database id
    pub database_id: String,
    /// Container id
    pub container_id: String,
    /// Container partition key path
    pub partition_key_path: String,
    /// Existence probe used by the writer
    pub probe_strategy: ProbeStrategy,
    /// Items requested per query page
    pub page_size: usize,
}

impl From<&HearthConfig> for SessionSettings {
    fn from(config: &HearthConfig) -> Self {
        Self {
            database_id: config.cosmosdb.database_name.clone(),
            container_id: config.cosmosdb.container_name.clone(),
            partition_key_path: config.cosmosdb.partition_key.clone(),
            probe_strategy: config.writer.probe_strategy,
            page_size: config.query.page_size,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&HearthConfig::default())
    }
}

/// A store together with its provisioned database and container
pub struct FamilySession<S: DocumentStore> {
    store: S,
    database: DatabaseHandle,
    container: ContainerHandle,
    probe_strategy: ProbeStrategy,
    page_size: usize,
}

impl<S: DocumentStore> FamilySession<S> {
    /// Provision the database and container and open a session on them
    ///
    /// # Errors
    ///
    /// Returns provisioning failures, including a partition key mismatch on
    /// an existing container.
    pub async fn open(store: S, settings: &SessionSettings) -> Result<Self> {
        let database = provision::ensure_database(&store, &settings.database_id).await?;
        let container = provision::ensure_container(
            &store,
            &database,
            &settings.container_id,
            &settings.partition_key_path,
        )
        .await?;

        Ok(Self {
            store,
            database,
            container,
            probe_strategy: settings.probe_strategy,
            page_size: settings.page_size,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle of the provisioned database
    pub fn database(&self) -> &DatabaseHandle {
        &self.database
    }

    /// Handle of the provisioned container
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    /// Probe strategy used by [`FamilySession::ensure_item`]
    pub fn probe_strategy(&self) -> ProbeStrategy {
        self.probe_strategy
    }

    /// Use a different probe strategy from now on
    pub fn set_probe_strategy(&mut self, strategy: ProbeStrategy) {
        self.probe_strategy = strategy;
    }

    /// See [`writer::ensure_item`]
    pub async fn ensure_item<T>(&self, document: &T) -> Result<EnsureOutcome>
    where
        T: PartitionedDocument + Clone + 'static,
    {
        writer::ensure_item(&self.store, &self.container, document, self.probe_strategy).await
    }

    /// See [`writer::ensure_items`]
    pub async fn ensure_items<T>(&self, documents: &[T]) -> Result<Vec<EnsureOutcome>>
    where
        T: PartitionedDocument + Clone + 'static,
    {
        writer::ensure_items(&self.store, &self.container, documents, self.probe_strategy).await
    }

    /// Point read by identity
    pub async fn read_item<T>(&self, id: &str, partition_key: &str) -> Result<ReadOutcome<T>>
    where
        T: PartitionedDocument + 'static,
    {
        self.store.read_item(&self.container, id, partition_key).await
    }

    /// See [`mutator::update_registration_and_grade`]
    pub async fn update_registration_and_grade(
        &self,
        id: &str,
        partition_key: &str,
        is_registered: bool,
        child_index: usize,
        grade: i32,
    ) -> Result<Family> {
        mutator::update_registration_and_grade(
            &self.store,
            &self.container,
            id,
            partition_key,
            is_registered,
            child_index,
            grade,
        )
        .await
    }

    /// See [`query::query`]
    pub fn query(&self, query_text: &str, scope: &QueryScope) -> query::FamilyStream {
        query::query(&self.store, &self.container, query_text, scope, self.page_size)
    }

    /// See [`query::query_all`]
    pub async fn query_all(&self, query_text: &str, scope: &QueryScope) -> Result<Vec<Family>> {
        query::query_all(&self.store, &self.container, query_text, scope, self.page_size).await
    }

    /// See [`cleanup::delete_item`]
    pub async fn delete_item(&self, id: &str, partition_key: &str) -> Result<()> {
        cleanup::delete_item(&self.store, &self.container, id, partition_key).await
    }

    /// Delete the database, then release the store
    ///
    /// # Errors
    ///
    /// Returns the deletion failure; the store is released either way.
    pub async fn delete_database_and_close(self) -> Result<()> {
        let Self {
            store, database, ..
        } = self;
        let result = cleanup::delete_database(&store, database).await;
        drop(store);
        tracing::debug!("Session closed");
        result
    }

    /// Release the store without deleting anything
    pub fn close(self) {
        drop(self);
        tracing::debug!("Session closed");
    }
}
