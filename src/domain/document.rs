//! Partitioned document contract
//!
//! Every document written through the store exposes its composite identity.
//! The partition key value returned here must be the value of the field the
//! container's partition key path points at; otherwise single-item operations
//! are routed to the wrong partition and observe the item as absent.

use super::errors::HearthError;
use super::ids::ItemIdentity;
use super::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A document addressable by `(id, partition key value)`
pub trait PartitionedDocument: Serialize + DeserializeOwned + Send + Sync {
    /// Document id
    fn id(&self) -> &str;

    /// Partition key value
    fn partition_key(&self) -> &str;

    /// Checks the identity invariants: non-empty id and partition key value
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Validation`] if either half is empty.
    fn validate(&self) -> Result<()> {
        self.identity().map(|_| ())
    }

    /// Composite identity of this document
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Validation`] if either half is empty.
    fn identity(&self) -> Result<ItemIdentity> {
        ItemIdentity::new(self.id(), self.partition_key()).map_err(|e| {
            HearthError::Validation(format!(
                "document [{},{}] is not addressable: {e}",
                self.partition_key(),
                self.id()
            ))
        })
    }
}
