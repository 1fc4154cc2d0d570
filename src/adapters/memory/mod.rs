//! In-memory document store
//!
//! [`InMemoryStore`] honors the same contract as the Cosmos DB adapter and
//! backs the test suite and `hearth demo --in-memory`.

pub mod predicate;
pub mod store;

pub use predicate::Predicate;
pub use store::{InMemoryStore, StoreOperation};
