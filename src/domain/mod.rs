//! Domain models and types for Hearth.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identity types** ([`DocumentId`], [`PartitionKeyValue`], [`ItemIdentity`])
//! - **The document model** ([`Family`] and its embedded [`Parent`], [`Child`],
//!   [`Pet`] and [`Address`])
//! - **The document contract** ([`PartitionedDocument`])
//! - **Error types** ([`HearthError`], [`CosmosDbError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Identity
//!
//! A document is addressed by its id *and* its partition key value:
//!
//! ```rust
//! use hearth::domain::{seed, PartitionedDocument};
//!
//! let family = seed::andersen_family();
//! let identity = family.identity().unwrap();
//! assert_eq!(identity.to_string(), "[Andersen,Andersen.1]");
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, HearthError>`]. Callers that
//! need to branch on the cause use [`HearthError::kind`]:
//!
//! ```rust
//! use hearth::domain::{CosmosDbError, ErrorKind, HearthError};
//!
//! let err: HearthError = CosmosDbError::NotFound("Andersen.1".into()).into();
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert_eq!(err.status(), Some(404));
//! ```

pub mod document;
pub mod errors;
pub mod family;
pub mod ids;
pub mod result;
pub mod seed;

// Re-export commonly used types for convenience
pub use document::PartitionedDocument;
pub use errors::{CosmosDbError, ErrorKind, HearthError};
pub use family::{Address, Child, Family, Parent, Pet, FAMILY_PARTITION_KEY_PATH};
pub use ids::{DocumentId, ItemIdentity, PartitionKeyValue};
pub use result::Result;
