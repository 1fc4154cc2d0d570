//! Idempotent item writer
//!
//! `ensure_item` writes a document at most once per identity: it probes
//! with a point read and creates the item only when the probe reports 404.
//! Existing content is never compared or overwritten. Every other probe
//! failure propagates; a transient fault is never read as absence.
//!
//! Two probes are available. [`ProbeStrategy::Typed`] deserializes the
//! existing item. [`ProbeStrategy::RawStream`] looks only at the status and
//! decodes the body only when debug logging wants its id. The raw response
//! is released on every exit path.
//!
//! # Concurrent writers
//!
//! Two writers racing on one identity can both observe 404 and both issue a
//! create. The store's uniqueness constraint on `(id, partition key)` then
//! rejects the second with a conflict, which is returned to that caller
//! as-is. No retry or reconciliation happens here.

use crate::adapters::database::{ContainerHandle, DocumentStore, ReadOutcome};
use crate::domain::{ItemIdentity, PartitionedDocument, Result};
use crate::{log_item_created, log_item_exists};

pub use crate::config::ProbeStrategy;

/// Result of [`ensure_item`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsureOutcome {
    /// Whether this call created the item
    pub created: bool,

    /// Request units of the create, or of the probe when nothing was
    /// created (0 when the store does not report it)
    pub request_charge: f64,
}

enum Probe {
    Exists { request_charge: f64 },
    Absent,
}

/// Create `document` unless an item with its identity already exists
///
/// # Errors
///
/// Returns a validation error, without issuing any request, if the document
/// has an empty id or partition key. Returns every probe failure other than
/// 404, and every create failure, including a conflict from a concurrent
/// writer.
pub async fn ensure_item<S, T>(
    store: &S,
    container: &ContainerHandle,
    document: &T,
    strategy: ProbeStrategy,
) -> Result<EnsureOutcome>
where
    S: DocumentStore,
    T: PartitionedDocument + Clone + 'static,
{
    let identity = document.identity()?;

    let probe = match strategy {
        ProbeStrategy::Typed => probe_typed::<S, T>(store, container, &identity).await?,
        ProbeStrategy::RawStream => probe_raw::<S, T>(store, container, &identity).await?,
    };

    match probe {
        Probe::Exists { request_charge } => {
            log_item_exists!(identity.id(), identity.partition_key());
            Ok(EnsureOutcome {
                created: false,
                request_charge,
            })
        }
        Probe::Absent => {
            let response = store
                .create_item(container, document, identity.partition_key())
                .await?;
            log_item_created!(
                identity.id(),
                identity.partition_key(),
                response.request_charge
            );
            Ok(EnsureOutcome {
                created: true,
                request_charge: response.request_charge,
            })
        }
    }
}

/// Apply [`ensure_item`] to each document in order
///
/// # Errors
///
/// Stops at and returns the first error; earlier documents stay written.
pub async fn ensure_items<S, T>(
    store: &S,
    container: &ContainerHandle,
    documents: &[T],
    strategy: ProbeStrategy,
) -> Result<Vec<EnsureOutcome>>
where
    S: DocumentStore,
    T: PartitionedDocument + Clone + 'static,
{
    let mut outcomes = Vec::with_capacity(documents.len());
    for document in documents {
        outcomes.push(ensure_item(store, container, document, strategy).await?);
    }
    Ok(outcomes)
}

async fn probe_typed<S, T>(
    store: &S,
    container: &ContainerHandle,
    identity: &ItemIdentity,
) -> Result<Probe>
where
    S: DocumentStore,
    T: PartitionedDocument + 'static,
{
    let outcome = store
        .read_item::<T>(container, identity.id(), identity.partition_key())
        .await?;

    Ok(match outcome {
        ReadOutcome::Found(existing) => {
            tracing::debug!(id = %existing.id(), "Probe found item");
            Probe::Exists {
                request_charge: 0.0,
            }
        }
        ReadOutcome::NotFound => Probe::Absent,
    })
}

async fn probe_raw<S, T>(
    store: &S,
    container: &ContainerHandle,
    identity: &ItemIdentity,
) -> Result<Probe>
where
    S: DocumentStore,
    T: PartitionedDocument + 'static,
{
    let mut response = store
        .read_item_raw::<T>(container, identity.id(), identity.partition_key())
        .await?;
    let request_charge = response.request_charge();

    if response.is_success() {
        if tracing::enabled!(tracing::Level::DEBUG) {
            // The outcome must not depend on the log level
            match response.into_document() {
                Ok(existing) => tracing::debug!(id = %existing.id(), "Probe found item"),
                Err(e) => tracing::debug!(
                    id = %identity.id(),
                    error = %e,
                    "Probe found item with an undecodable body"
                ),
            }
        } else {
            response.release();
        }
        Ok(Probe::Exists { request_charge })
    } else if response.is_not_found() {
        response.release();
        Ok(Probe::Absent)
    } else {
        let err = response.to_error();
        response.release();
        Err(err)
    }
}
