//! Logging and observability
//!
//! Structured logging on `tracing`: a console layer, an optional JSON
//! rolling-file layer, and macros for the writer's two outcomes.
//!
//! # Example
//!
//! ```no_run
//! use hearth::logging::init_logging;
//! use hearth::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(database = "FamilyDatabase", "Database ready");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log that the writer created an item
///
/// # Example
///
/// ```no_run
/// use hearth::log_item_created;
///
/// log_item_created!("Andersen.1", "Andersen", 7.14);
/// ```
#[macro_export]
macro_rules! log_item_created {
    ($id:expr, $partition_key:expr, $request_charge:expr) => {
        tracing::info!(
            id = %$id,
            partition_key = %$partition_key,
            request_charge = $request_charge,
            created = true,
            "Created item"
        );
    };
}

/// Log that the writer found an existing item and skipped the create
///
/// # Example
///
/// ```no_run
/// use hearth::log_item_exists;
///
/// log_item_exists!("Andersen.1", "Andersen");
/// ```
#[macro_export]
macro_rules! log_item_exists {
    ($id:expr, $partition_key:expr) => {
        tracing::info!(
            id = %$id,
            partition_key = %$partition_key,
            created = false,
            "Item already exists"
        );
    };
}
