//! Domain error types
//!
//! This module defines the error hierarchy for Hearth. All errors are
//! domain-specific and don't expose third-party SDK types. Every error can be
//! classified into an [`ErrorKind`], which is what callers branch on.

use thiserror::Error;

/// Main Hearth error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum HearthError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors reported by the document store
    #[error("Cosmos DB error: {0}")]
    CosmosDb(#[from] CosmosDbError),

    /// A document violated the identity invariants (empty id or partition key)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A structural access outside the bounds of a document
    #[error("Child index {index} out of range for family {id} with {len} children")]
    ChildIndexOutOfRange {
        /// Family document id
        id: String,
        /// Requested index
        index: usize,
        /// Number of children in the document
        len: usize,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document store errors
///
/// Each variant preserves the classification the store reported. The
/// numeric status is available through [`CosmosDbError::status`].
#[derive(Debug, Error)]
pub enum CosmosDbError {
    /// The addressed database, container or item does not exist (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Duplicate identity on create, or a lost precondition on replace (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Throttling error (429)
    #[error("Request rate too large (429): {0}")]
    Throttled(String),

    /// Timeout (408)
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Failed to reach the service
    #[error("Failed to connect to Cosmos DB: {0}")]
    ConnectionFailed(String),

    /// Authentication or authorization failed (401/403)
    ///
    /// `status` is `None` when the credential was rejected before any
    /// request reached the service.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// HTTP status code reported by the service
        status: Option<u16>,
        /// Service message
        message: String,
    },

    /// Existing container was created with a different partition key path
    #[error("Partition key mismatch: {0}")]
    PartitionKeyMismatch(String),

    /// Invalid request (400), including malformed query text
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to deserialize response
    #[error("Failed to deserialize response: {0}")]
    DeserializationFailed(String),

    /// Any other status reported by the service
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code reported by the service
        status: u16,
        /// Service message
        message: String,
    },
}

impl CosmosDbError {
    /// Builds the error matching an HTTP status code reported by the store
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => CosmosDbError::InvalidRequest(message),
            401 | 403 => CosmosDbError::AuthenticationFailed {
                status: Some(status),
                message,
            },
            404 => CosmosDbError::NotFound(message),
            408 => CosmosDbError::Timeout(message),
            409 => CosmosDbError::Conflict(message),
            429 => CosmosDbError::Throttled(message),
            _ => CosmosDbError::Status { status, message },
        }
    }

    /// HTTP status code of this error, if the store reported one
    pub fn status(&self) -> Option<u16> {
        match self {
            CosmosDbError::NotFound(_) => Some(404),
            CosmosDbError::Conflict(_) => Some(409),
            CosmosDbError::Throttled(_) => Some(429),
            CosmosDbError::Timeout(_) => Some(408),
            CosmosDbError::InvalidRequest(_) => Some(400),
            CosmosDbError::Status { status, .. } => Some(*status),
            CosmosDbError::AuthenticationFailed { status, .. } => *status,
            CosmosDbError::ConnectionFailed(_)
            | CosmosDbError::PartitionKeyMismatch(_)
            | CosmosDbError::DeserializationFailed(_) => None,
        }
    }
}

/// Coarse error classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed resource is absent
    NotFound,
    /// Duplicate identity
    Conflict,
    /// Network, timeout, throttling or server-side faults
    Transient,
    /// Misconfiguration, including a partition key mismatch
    Configuration,
    /// Misuse of the API, e.g. an invalid child index or an invalid document
    Programming,
    /// Everything else
    Other,
}

impl HearthError {
    /// Classifies this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HearthError::Configuration(_) => ErrorKind::Configuration,
            HearthError::Validation(_) | HearthError::ChildIndexOutOfRange { .. } => {
                ErrorKind::Programming
            }
            HearthError::CosmosDb(err) => match err {
                CosmosDbError::NotFound(_) => ErrorKind::NotFound,
                CosmosDbError::Conflict(_) => ErrorKind::Conflict,
                CosmosDbError::Throttled(_)
                | CosmosDbError::Timeout(_)
                | CosmosDbError::ConnectionFailed(_) => ErrorKind::Transient,
                CosmosDbError::AuthenticationFailed { .. }
                | CosmosDbError::PartitionKeyMismatch(_) => ErrorKind::Configuration,
                CosmosDbError::Status { status, .. } if *status >= 500 => ErrorKind::Transient,
                _ => ErrorKind::Other,
            },
            HearthError::Serialization(_) | HearthError::Io(_) | HearthError::Other(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Status code reported by the store, unchanged
    pub fn status(&self) -> Option<u16> {
        match self {
            HearthError::CosmosDb(err) => err.status(),
            _ => None,
        }
    }

    /// Whether this error signals an absent resource
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        HearthError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        HearthError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        HearthError::Configuration(format!("TOML parse error: {err}"))
    }
}
