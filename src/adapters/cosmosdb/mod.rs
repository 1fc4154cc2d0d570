//! Azure Cosmos DB integration
//!
//! This module provides the Azure Cosmos DB implementation of
//! [`DocumentStore`](crate::adapters::database::DocumentStore).

pub mod client;

pub use client::CosmosDbStore;
