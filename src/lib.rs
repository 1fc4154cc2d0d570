// Hearth - Family document store client for Azure Cosmos DB
// Copyright (c) 2025 Hearth Contributors
// Licensed under the MIT License

//! # Hearth - Family documents on Azure Cosmos DB
//!
//! Hearth provisions a partitioned container, writes Family documents
//! idempotently, updates them in place, queries them page by page and
//! cleans up afterwards.
//!
//! ## Overview
//!
//! This library provides:
//! - **Provisioning** of a database and a container bound to a partition key path
//! - **Idempotent writes** guarded by a point-read probe (typed or raw-stream)
//! - **Read-modify-replace** updates with last-writer-wins semantics
//! - **Paginated queries** exposed as a `Stream`
//! - **Cleanup** of items and whole databases
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Provisioning, writer, mutator, query runner, cleanup and the session
//! - [`adapters`] - The `DocumentStore` contract, Cosmos DB and in-memory stores
//! - [`domain`] - Identity types, the Family model and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hearth::adapters::database::create_document_store;
//! use hearth::config::load_config;
//! use hearth::core::{FamilySession, SessionSettings};
//! use hearth::domain::seed;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("hearth.toml")?;
//!     let store = create_document_store(&config)?;
//!
//!     let session = FamilySession::open(store, &SessionSettings::from(&config)).await?;
//!     let outcome = session.ensure_item(&seed::andersen_family()).await?;
//!     println!("created: {}", outcome.created);
//!
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`domain::Result`]. Branch on
//! [`HearthError::kind`](domain::HearthError::kind) rather than on messages:
//!
//! ```rust
//! use hearth::domain::{CosmosDbError, ErrorKind, HearthError};
//!
//! let err: HearthError = CosmosDbError::from_status(429, "throttled").into();
//! assert_eq!(err.kind(), ErrorKind::Transient);
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
