//! Document store abstraction layer
//!
//! This module defines the contract Hearth consumes from a document store,
//! allowing the core to run against Azure Cosmos DB or the in-memory store.

pub mod factory;
pub mod response;
pub mod traits;

pub use factory::create_document_store;
pub use response::RawItemResponse;
pub use traits::{
    ContainerHandle, DatabaseHandle, DocumentStore, PageSource, QueryScope, ReadOutcome,
    ResultPage, WriteResponse,
};
