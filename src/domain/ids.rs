//! Document identity types with validation
//!
//! A document is addressed by its id together with its partition key value.
//! Both halves are newtype wrappers that reject empty values, so an
//! [`ItemIdentity`] can always be routed to exactly one partition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document identifier newtype wrapper
///
/// Unique within a partition only.
///
/// # Examples
///
/// ```
/// use hearth::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("Andersen.1").unwrap();
/// assert_eq!(id.as_str(), "Andersen.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId from a string
    ///
    /// Returns `Err` if the id is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the document ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Partition key value newtype wrapper
///
/// The value of the document field named by the container's partition key
/// path (for families, the last name).
///
/// # Examples
///
/// ```
/// use hearth::domain::ids::PartitionKeyValue;
///
/// let pk = PartitionKeyValue::new("Wakefield").unwrap();
/// assert_eq!(pk.as_str(), "Wakefield");
/// assert!(PartitionKeyValue::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKeyValue(String);

impl PartitionKeyValue {
    /// Creates a new PartitionKeyValue from a string
    ///
    /// Returns `Err` if the value is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err("Partition key value cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// Returns the partition key value as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PartitionKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartitionKeyValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PartitionKeyValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Composite identity of a stored item: `(id, partition key value)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemIdentity {
    /// Document id
    pub id: DocumentId,

    /// Partition key value
    pub partition_key: PartitionKeyValue,
}

impl ItemIdentity {
    /// Creates an identity from raw strings, validating both halves
    pub fn new(id: impl Into<String>, partition_key: impl Into<String>) -> Result<Self, String> {
        Ok(Self {
            id: DocumentId::new(id)?,
            partition_key: PartitionKeyValue::new(partition_key)?,
        })
    }

    /// Document id as a string slice
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Partition key value as a string slice
    pub fn partition_key(&self) -> &str {
        self.partition_key.as_str()
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.partition_key, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_valid() {
        let id = DocumentId::new("Wakefield.7").unwrap();
        assert_eq!(id.as_str(), "Wakefield.7");
        assert_eq!(id.to_string(), "Wakefield.7");
    }

    #[test]
    fn test_document_id_empty() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("   ").is_err());
    }

    #[test]
    fn test_partition_key_value_from_str() {
        let pk = PartitionKeyValue::from_str("Andersen").unwrap();
        assert_eq!(pk.into_inner(), "Andersen");
    }

    #[test]
    fn test_item_identity() {
        let identity = ItemIdentity::new("Andersen.1", "Andersen").unwrap();
        assert_eq!(identity.id(), "Andersen.1");
        assert_eq!(identity.partition_key(), "Andersen");
        assert_eq!(identity.to_string(), "[Andersen,Andersen.1]");
    }

    #[test]
    fn test_item_identity_rejects_empty_partition_key() {
        assert!(ItemIdentity::new("Andersen.1", "").is_err());
        assert!(ItemIdentity::new("", "Andersen").is_err());
    }

    #[test]
    fn test_identity_equality_is_composite() {
        let a = ItemIdentity::new("Andersen.1", "Andersen").unwrap();
        let b = ItemIdentity::new("Andersen.1", "Smith").unwrap();
        assert_ne!(a, b);
    }
}
