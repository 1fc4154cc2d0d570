//! Configuration schema types
//!
//! This module defines the configuration structure for Hearth. Every section
//! has defaults, so a file only needs the Cosmos DB endpoint and key.

use crate::config::secret::{secret_string, SecretString};
use crate::domain::FAMILY_PARTITION_KEY_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main Hearth configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HearthConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Azure Cosmos DB configuration
    #[serde(default)]
    pub cosmosdb: CosmosDbConfig,

    /// Idempotent writer settings
    #[serde(default)]
    pub writer: WriterConfig,

    /// Query runner settings
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HearthConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.validate_local()?;
        self.cosmosdb.validate_connection()?;
        Ok(())
    }

    /// Validates everything except the Cosmos DB endpoint and key
    ///
    /// This is what the in-memory store needs.
    ///
    /// # Errors
    ///
    /// Returns an error if any checked value is invalid
    pub fn validate_local(&self) -> Result<(), String> {
        self.application.validate()?;
        self.cosmosdb.validate_names()?;
        self.query.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Azure Cosmos DB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmosDbConfig {
    /// Cosmos DB account endpoint URL
    #[serde(default)]
    pub endpoint: String,

    /// Cosmos DB primary key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default = "empty_secret")]
    pub key: SecretString,

    /// Database name
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Container name
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Partition key path
    #[serde(default = "default_partition_key")]
    pub partition_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for CosmosDbConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            key: empty_secret(),
            database_name: default_database_name(),
            container_name: default_container_name(),
            partition_key: default_partition_key(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl CosmosDbConfig {
    fn validate_connection(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.endpoint.is_empty() {
            return Err("cosmosdb.endpoint cannot be empty".to_string());
        }

        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("cosmosdb.endpoint is not a valid URL: {e}"))?;
        match url.scheme() {
            "https" => {}
            // The local emulator is the only plain-http endpoint accepted
            "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => {}
            _ => {
                return Err(
                    "cosmosdb.endpoint must start with https:// (http:// only for localhost)"
                        .to_string(),
                )
            }
        }

        if self.key.expose_secret().is_empty() {
            return Err("cosmosdb.key cannot be empty".to_string());
        }

        if self.request_timeout_seconds == 0 {
            return Err("cosmosdb.request_timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }

    fn validate_names(&self) -> Result<(), String> {
        if self.database_name.trim().is_empty() {
            return Err("cosmosdb.database_name cannot be empty".to_string());
        }

        if self.container_name.trim().is_empty() {
            return Err("cosmosdb.container_name cannot be empty".to_string());
        }

        if !self.partition_key.starts_with('/') || self.partition_key.len() < 2 {
            return Err(format!(
                "cosmosdb.partition_key must be a path such as '/LastName', got '{}'",
                self.partition_key
            ));
        }

        Ok(())
    }
}

/// How the writer probes for an existing item before creating it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStrategy {
    /// Deserialize the point read into the full document
    Typed,
    /// Inspect only the response status; decode the body lazily
    #[default]
    RawStream,
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStrategy::Typed => write!(f, "typed"),
            ProbeStrategy::RawStream => write!(f, "raw_stream"),
        }
    }
}

impl FromStr for ProbeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typed" => Ok(ProbeStrategy::Typed),
            "raw_stream" | "raw-stream" => Ok(ProbeStrategy::RawStream),
            other => Err(format!(
                "Invalid probe_strategy '{other}'. Must be 'typed' or 'raw_stream'"
            )),
        }
    }
}

/// Idempotent writer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WriterConfig {
    /// Existence probe used by `ensure_item`
    #[serde(default)]
    pub probe_strategy: ProbeStrategy,
}

/// Query runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl QueryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(format!(
                "query.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn empty_secret() -> SecretString {
    secret_string(String::new())
}

fn default_database_name() -> String {
    "FamilyDatabase".to_string()
}

fn default_container_name() -> String {
    "FamilyContainer".to_string()
}

fn default_partition_key() -> String {
    FAMILY_PARTITION_KEY_PATH.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn remote_config(endpoint: &str) -> HearthConfig {
        let mut config = HearthConfig::default();
        config.cosmosdb.endpoint = endpoint.to_string();
        config.cosmosdb.key = secret_string("a2V5".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = HearthConfig::default();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.cosmosdb.database_name, "FamilyDatabase");
        assert_eq!(config.cosmosdb.container_name, "FamilyContainer");
        assert_eq!(config.cosmosdb.partition_key, "/LastName");
        assert_eq!(config.writer.probe_strategy, ProbeStrategy::RawStream);
        assert_eq!(config.query.page_size, 100);
        assert!(config.validate_local().is_ok());
    }

    #[test]
    fn test_defaults_need_endpoint_and_key() {
        assert!(HearthConfig::default().validate().is_err());
    }

    #[test_case("https://acct.documents.azure.com:443/", true ; "https endpoint")]
    #[test_case("http://localhost:8081/", true ; "local emulator")]
    #[test_case("http://127.0.0.1:8081/", true ; "loopback emulator")]
    #[test_case("http://acct.documents.azure.com/", false ; "plain http remote")]
    #[test_case("not a url", false ; "not a url")]
    fn test_endpoint_validation(endpoint: &str, valid: bool) {
        assert_eq!(remote_config(endpoint).validate().is_ok(), valid);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut config = remote_config("https://acct.documents.azure.com:443/");
        config.cosmosdb.key = secret_string(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.contains("key"));
    }

    #[test]
    fn test_partition_key_must_be_path() {
        let mut config = HearthConfig::default();
        config.cosmosdb.partition_key = "LastName".to_string();
        assert!(config.validate_local().is_err());
    }

    #[test_case(0, false ; "zero")]
    #[test_case(1, true ; "one")]
    #[test_case(1000, true ; "max")]
    #[test_case(1001, false ; "over max")]
    fn test_page_size_bounds(page_size: usize, valid: bool) {
        let mut config = HearthConfig::default();
        config.query.page_size = page_size;
        assert_eq!(config.validate_local().is_ok(), valid);
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = HearthConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate_local().is_err());
    }

    #[test]
    fn test_probe_strategy_parsing() {
        assert_eq!("typed".parse::<ProbeStrategy>().unwrap(), ProbeStrategy::Typed);
        assert_eq!("raw-stream".parse::<ProbeStrategy>().unwrap(), ProbeStrategy::RawStream);
        assert_eq!("RAW_STREAM".parse::<ProbeStrategy>().unwrap(), ProbeStrategy::RawStream);
        assert!("stream".parse::<ProbeStrategy>().is_err());
    }

    #[test]
    fn test_probe_strategy_toml() {
        let config: HearthConfig = toml::from_str("[writer]\nprobe_strategy = \"typed\"\n").unwrap();
        assert_eq!(config.writer.probe_strategy, ProbeStrategy::Typed);
    }
}
