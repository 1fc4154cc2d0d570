//! Core logic for Hearth.
//!
//! # Modules
//!
//! - [`provision`] - Idempotent database and container provisioning
//! - [`writer`] - Idempotent item creation with a read-before-write probe
//! - [`mutator`] - Read-modify-replace updates
//! - [`query`] - Paginated queries flattened into a stream
//! - [`cleanup`] - Item and database deletion
//! - [`session`] - [`FamilySession`], the store plus its handles
//! - [`demo`] - The getting-started walkthrough
//!
//! # Example
//!
//! ```rust
//! use hearth::adapters::memory::InMemoryStore;
//! use hearth::core::{FamilySession, SessionSettings};
//! use hearth::domain::seed;
//!
//! # #[tokio::main]
//! # async fn main() -> hearth::domain::Result<()> {
//! let session = FamilySession::open(InMemoryStore::new(), &SessionSettings::default()).await?;
//!
//! let first = session.ensure_item(&seed::andersen_family()).await?;
//! let second = session.ensure_item(&seed::andersen_family()).await?;
//! assert!(first.created);
//! assert!(!second.created);
//!
//! session.delete_database_and_close().await?;
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod demo;
pub mod mutator;
pub mod provision;
pub mod query;
pub mod session;
pub mod writer;

pub use demo::{run_demo, DemoReport};
pub use query::{DocumentStream, FamilyStream};
pub use session::{FamilySession, SessionSettings};
pub use writer::{EnsureOutcome, ProbeStrategy};
