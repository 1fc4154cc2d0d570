//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HearthConfig;
use super::secret::secret_string;
use crate::domain::errors::HearthError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads and validates configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HearthConfig
/// 4. Applies environment variable overrides (HEARTH_* prefix, plus
///    `ENDPOINT_URI` and `PRIMARY_KEY`)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use hearth::config::loader::load_config;
///
/// let config = load_config("hearth.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HearthConfig> {
    let config = read_config(path)?;
    validate(&config, HearthConfig::validate)?;
    Ok(config)
}

/// Reads configuration from a TOML file without validating it
///
/// # Errors
///
/// Returns an error if the file cannot be read, substituted or parsed.
pub fn read_config(path: impl AsRef<Path>) -> Result<HearthConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HearthError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HearthError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: HearthConfig = toml::from_str(&contents)
        .map_err(|e| HearthError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Builds configuration from defaults and environment variables only
///
/// # Errors
///
/// Returns an error if an override cannot be parsed or the result does not
/// validate.
pub fn config_from_env() -> Result<HearthConfig> {
    let mut config = HearthConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config, HearthConfig::validate)?;
    Ok(config)
}

/// Runs a validation function, wrapping its message as a configuration error
pub(crate) fn validate(
    config: &HearthConfig,
    check: impl FnOnce(&HearthConfig) -> std::result::Result<(), String>,
) -> Result<()> {
    check(config).map_err(|e| {
        HearthError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HearthError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(HearthError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    let mut result = lines.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        HearthError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

/// Applies environment variable overrides
///
/// Environment variables follow the pattern `HEARTH_<SECTION>_<KEY>`, for
/// example `HEARTH_COSMOSDB_ENDPOINT` or `HEARTH_QUERY_PAGE_SIZE`.
/// `ENDPOINT_URI` and `PRIMARY_KEY` are also honored for the endpoint and
/// key; the `HEARTH_` names win when both are set.
fn apply_env_overrides(config: &mut HearthConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("HEARTH_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Cosmos DB overrides
    if let Some(val) = var("HEARTH_COSMOSDB_ENDPOINT").or_else(|| var("ENDPOINT_URI")) {
        config.cosmosdb.endpoint = val;
    }
    if let Some(val) = var("HEARTH_COSMOSDB_KEY").or_else(|| var("PRIMARY_KEY")) {
        config.cosmosdb.key = secret_string(val);
    }
    if let Some(val) = var("HEARTH_COSMOSDB_DATABASE_NAME") {
        config.cosmosdb.database_name = val;
    }
    if let Some(val) = var("HEARTH_COSMOSDB_CONTAINER_NAME") {
        config.cosmosdb.container_name = val;
    }
    if let Some(val) = var("HEARTH_COSMOSDB_PARTITION_KEY") {
        config.cosmosdb.partition_key = val;
    }
    if let Some(val) = var("HEARTH_COSMOSDB_REQUEST_TIMEOUT_SECONDS") {
        config.cosmosdb.request_timeout_seconds =
            parse_override("HEARTH_COSMOSDB_REQUEST_TIMEOUT_SECONDS", &val)?;
    }

    // Writer overrides
    if let Some(val) = var("HEARTH_WRITER_PROBE_STRATEGY") {
        config.writer.probe_strategy = parse_override("HEARTH_WRITER_PROBE_STRATEGY", &val)?;
    }

    // Query overrides
    if let Some(val) = var("HEARTH_QUERY_PAGE_SIZE") {
        config.query.page_size = parse_override("HEARTH_QUERY_PAGE_SIZE", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("HEARTH_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("HEARTH_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("HEARTH_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("HEARTH_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
