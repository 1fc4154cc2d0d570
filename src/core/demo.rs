//! Getting-started walkthrough
//!
//! Provisions `FamilyDatabase`/`FamilyContainer`, writes the Andersen and
//! Wakefield families idempotently, queries the Andersens, registers the
//! Wakefields and moves their first child to grade 6. With cleanup enabled
//! it then deletes `Wakefield.7` and the database.

use super::session::{FamilySession, SessionSettings};
use super::writer::EnsureOutcome;
use crate::adapters::database::{DocumentStore, QueryScope};
use crate::domain::{seed, Family, PartitionedDocument, Result};

/// Query the walkthrough runs
pub const ANDERSEN_QUERY: &str = "SELECT * FROM c WHERE c.LastName = 'Andersen'";

/// What the walkthrough did
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Outcome of writing the Andersen family
    pub andersen: EnsureOutcome,

    /// Outcome of writing the Wakefield family
    pub wakefield: EnsureOutcome,

    /// Documents returned by [`ANDERSEN_QUERY`]
    pub query_results: Vec<Family>,

    /// Wakefield family after the update
    pub updated: Family,

    /// Whether the item and database were deleted
    pub cleaned_up: bool,
}

/// Run the walkthrough against `store`
///
/// # Errors
///
/// Stops at and returns the first failing step.
pub async fn run_demo<S: DocumentStore>(
    store: S,
    settings: &SessionSettings,
    cleanup: bool,
) -> Result<DemoReport> {
    tracing::info!(
        database = %settings.database_id,
        container = %settings.container_id,
        strategy = %settings.probe_strategy,
        "Beginning operations"
    );

    let session = FamilySession::open(store, settings).await?;

    let andersen = seed::andersen_family();
    let wakefield = seed::wakefield_family();
    let andersen_outcome = session.ensure_item(&andersen).await?;
    let wakefield_outcome = session.ensure_item(&wakefield).await?;

    let query_results = session
        .query_all(ANDERSEN_QUERY, &QueryScope::CrossPartition)
        .await?;
    for family in &query_results {
        tracing::info!(id = %family.id(), body = %family, "Read family");
    }

    let updated = session
        .update_registration_and_grade(wakefield.id(), wakefield.partition_key(), true, 0, 6)
        .await?;
    tracing::info!(
        id = %updated.id(),
        partition_key = %updated.partition_key(),
        body = %updated,
        "Updated family"
    );

    if cleanup {
        session
            .delete_item(wakefield.id(), wakefield.partition_key())
            .await?;
        session.delete_database_and_close().await?;
    } else {
        session.close();
    }

    tracing::info!("End of demo");

    Ok(DemoReport {
        andersen: andersen_outcome,
        wakefield: wakefield_outcome,
        query_results,
        updated,
        cleaned_up: cleanup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::config::ProbeStrategy;

    #[tokio::test]
    async fn test_demo_without_cleanup_is_rerunnable() {
        let store = InMemoryStore::new();
        let settings = SessionSettings::default();

        let first = run_demo(store.clone(), &settings, false).await.unwrap();
        assert!(first.andersen.created);
        assert!(first.wakefield.created);
        assert_eq!(first.query_results.len(), 1);
        assert_eq!(first.query_results[0].id, "Andersen.1");
        assert!(first.updated.is_registered);
        assert_eq!(first.updated.children[0].grade, 6);
        assert!(store.has_database("FamilyDatabase"));

        let second = run_demo(store.clone(), &settings, false).await.unwrap();
        assert!(!second.andersen.created);
        assert!(!second.wakefield.created);
    }

    #[tokio::test]
    async fn test_demo_with_cleanup_removes_database() {
        let store = InMemoryStore::new();
        let settings = SessionSettings {
            probe_strategy: ProbeStrategy::Typed,
            ..SessionSettings::default()
        };

        let report = run_demo(store.clone(), &settings, true).await.unwrap();
        assert!(report.cleaned_up);
        assert!(!store.has_database("FamilyDatabase"));
    }
}
