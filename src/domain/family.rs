//! Family aggregate document
//!
//! A family is stored as one document with its parents, children, pets and
//! address embedded. Field names follow the stored representation: the
//! identity field is lowercase `id`, everything else is PascalCase. The
//! container is partitioned on `/LastName`.

use super::document::PartitionedDocument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition key path families are stored under
pub const FAMILY_PARTITION_KEY_PATH: &str = "/LastName";

/// Family aggregate root document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Family {
    /// Document id, unique within the partition
    #[serde(rename = "id")]
    pub id: String,

    /// Partition key value
    pub last_name: String,

    /// Parents, in declaration order
    #[serde(default)]
    pub parents: Vec<Parent>,

    /// Children, in declaration order
    #[serde(default)]
    pub children: Vec<Child>,

    /// Home address
    pub address: Address,

    /// Registration flag
    #[serde(default)]
    pub is_registered: bool,
}

/// Parent entry embedded in a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parent {
    /// Family name, when it differs from the family's last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// First name
    pub first_name: String,
}

/// Child entry embedded in a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Child {
    /// Family name, when it differs from the family's last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// First name
    pub first_name: String,

    /// Gender
    pub gender: String,

    /// School grade
    pub grade: i32,

    /// Pets, in declaration order
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Pet entry embedded in a child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pet {
    /// Given name
    pub given_name: String,
}

/// Family address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    /// State
    pub state: String,

    /// County
    pub county: String,

    /// City
    pub city: String,
}

impl Parent {
    /// Creates a parent with only a first name
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            family_name: None,
            first_name: first_name.into(),
        }
    }

    /// Sets the family name
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }
}

impl Child {
    /// Creates a child without pets
    pub fn new(first_name: impl Into<String>, gender: impl Into<String>, grade: i32) -> Self {
        Self {
            family_name: None,
            first_name: first_name.into(),
            gender: gender.into(),
            grade,
            pets: Vec::new(),
        }
    }

    /// Sets the family name
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    /// Adds a pet
    pub fn with_pet(mut self, given_name: impl Into<String>) -> Self {
        self.pets.push(Pet {
            given_name: given_name.into(),
        });
        self
    }
}

impl PartitionedDocument for Family {
    fn id(&self) -> &str {
        &self.id
    }

    fn partition_key(&self) -> &str {
        &self.last_name
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
