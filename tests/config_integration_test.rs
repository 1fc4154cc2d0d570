//! Integration tests for configuration loading and validation
//!
//! Every test takes `ENV_MUTEX`: loading applies environment overrides, so
//! a test that sets a variable would otherwise leak into its neighbours.

use hearth::config::{config_from_env, load_config, ProbeStrategy};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "HEARTH_APPLICATION_LOG_LEVEL",
    "HEARTH_COSMOSDB_ENDPOINT",
    "HEARTH_COSMOSDB_KEY",
    "HEARTH_COSMOSDB_DATABASE_NAME",
    "HEARTH_COSMOSDB_CONTAINER_NAME",
    "HEARTH_COSMOSDB_PARTITION_KEY",
    "HEARTH_COSMOSDB_REQUEST_TIMEOUT_SECONDS",
    "HEARTH_WRITER_PROBE_STRATEGY",
    "HEARTH_QUERY_PAGE_SIZE",
    "HEARTH_LOGGING_LOCAL_ENABLED",
    "HEARTH_LOGGING_LOCAL_PATH",
    "HEARTH_LOGGING_LOCAL_ROTATION",
    "ENDPOINT_URI",
    "PRIMARY_KEY",
    "TEST_HEARTH_COSMOS_KEY",
];

fn cleanup_env_vars() {
    for name in OVERRIDE_VARS {
        std::env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "test-key-12345"
database_name = "TestDatabase"
container_name = "TestContainer"
partition_key = "/LastName"
request_timeout_seconds = 120

[writer]
probe_strategy = "typed"

[query]
page_size = 25

[logging]
local_enabled = true
local_path = "/tmp/hearth"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(
        config.cosmosdb.endpoint,
        "https://test.documents.azure.com:443/"
    );
    assert_eq!(config.cosmosdb.key.expose_secret(), "test-key-12345");
    assert_eq!(config.cosmosdb.database_name, "TestDatabase");
    assert_eq!(config.cosmosdb.container_name, "TestContainer");
    assert_eq!(config.cosmosdb.request_timeout_seconds, 120);
    assert_eq!(config.writer.probe_strategy, ProbeStrategy::Typed);
    assert_eq!(config.query.page_size, 25);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/hearth");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "test-key"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.cosmosdb.database_name, "FamilyDatabase");
    assert_eq!(config.cosmosdb.container_name, "FamilyContainer");
    assert_eq!(config.cosmosdb.partition_key, "/LastName");
    assert_eq!(config.cosmosdb.request_timeout_seconds, 30);
    assert_eq!(config.writer.probe_strategy, ProbeStrategy::RawStream);
    assert_eq!(config.query.page_size, 100);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_HEARTH_COSMOS_KEY", "secret_key");

    let temp_file = write_config(
        r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "${TEST_HEARTH_COSMOS_KEY}"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(config.cosmosdb.key.expose_secret(), "secret_key");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_var_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "${TEST_HEARTH_COSMOS_KEY}"
"#,
    );

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_HEARTH_COSMOS_KEY"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("HEARTH_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("HEARTH_WRITER_PROBE_STRATEGY", "typed");
    std::env::set_var("HEARTH_QUERY_PAGE_SIZE", "7");

    let temp_file = write_config(
        r#"
[application]
log_level = "info"

[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "test-key"

[query]
page_size = 500
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.writer.probe_strategy, ProbeStrategy::Typed);
    assert_eq!(config.query.page_size, 7);

    cleanup_env_vars();
}

#[test]
fn test_config_from_env_uses_quickstart_variables() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("ENDPOINT_URI", "https://localhost:8081/");
    std::env::set_var("PRIMARY_KEY", "emulator-key");

    let config = config_from_env().expect("Failed to build config");
    assert_eq!(config.cosmosdb.endpoint, "https://localhost:8081/");
    assert_eq!(config.cosmosdb.key.expose_secret(), "emulator-key");
    assert_eq!(config.cosmosdb.database_name, "FamilyDatabase");

    // The HEARTH_ names win over the quickstart ones
    std::env::set_var("HEARTH_COSMOSDB_ENDPOINT", "https://other.documents.azure.com:443/");
    let config = config_from_env().expect("Failed to build config");
    assert_eq!(
        config.cosmosdb.endpoint,
        "https://other.documents.azure.com:443/"
    );

    cleanup_env_vars();
}

#[test]
fn test_config_from_env_without_endpoint_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    assert!(config_from_env().is_err());
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for contents in [
        // unknown log level
        "[application]\nlog_level = \"loud\"\n[cosmosdb]\nendpoint = \"https://a.documents.azure.com/\"\nkey = \"k\"\n",
        // plain http outside the emulator
        "[cosmosdb]\nendpoint = \"http://a.documents.azure.com/\"\nkey = \"k\"\n",
        // empty key
        "[cosmosdb]\nendpoint = \"https://a.documents.azure.com/\"\nkey = \"\"\n",
        // partition key is not a path
        "[cosmosdb]\nendpoint = \"https://a.documents.azure.com/\"\nkey = \"k\"\npartition_key = \"LastName\"\n",
        // unknown probe strategy
        "[cosmosdb]\nendpoint = \"https://a.documents.azure.com/\"\nkey = \"k\"\n[writer]\nprobe_strategy = \"stream\"\n",
    ] {
        let temp_file = write_config(contents);
        assert!(load_config(temp_file.path()).is_err(), "accepted: {contents}");
    }
}
