//! Account key storage
//!
//! The Cosmos DB primary key grants full access to the account, so it never
//! travels as a bare `String` once loaded. [`SecretString`] zeroes its
//! buffer on drop and prints as redacted; code that needs the key for
//! signing asks for it with `expose_secret()`.
//!
//! ```rust
//! use hearth::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("primary-key".to_string());
//! assert_eq!(key.expose_secret(), "primary-key");
//! assert!(!format!("{key:?}").contains("primary-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// Key material held inside a [`SecretString`]
#[derive(Clone, Default, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl SecretValue {
    /// Whether no key was supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Redacted form for summaries: only the length is shown
    pub fn masked(&self) -> String {
        if self.0.is_empty() {
            "<empty>".to_string()
        } else {
            format!("<redacted, {} chars>", self.0.chars().count())
        }
    }
}

// The derived Debug would print the key when a SecretValue is handled
// outside its Secret wrapper.
impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

// Written back as plain text so a loaded config can be saved again.
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(key: String) -> Self {
        SecretValue(key)
    }
}

impl From<SecretValue> for String {
    fn from(mut key: SecretValue) -> Self {
        std::mem::take(&mut key.0)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroized, redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a loaded key
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
