//! Subscriber setup
//!
//! Human-readable lines always go to the console. With `local_enabled`,
//! the same events are also appended as JSON to `hearth.log*` under
//! `local_path`, through a non-blocking writer whose buffer is flushed when
//! the returned [`LoggingGuard`] drops.

use crate::config::LoggingConfig;
use crate::domain::{HearthError, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "hearth.log";

/// Holds the file writer open until dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file: Option<(PathBuf, WorkerGuard)>,
}

impl LoggingGuard {
    /// Directory the JSON log is written to, if file logging is on
    pub fn file_dir(&self) -> Option<&Path> {
        self.file.as_ref().map(|(dir, _)| dir.as_path())
    }
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, replaces the `hearth=<level>` directive built from
/// `log_level`.
///
/// # Errors
///
/// Fails on an unknown level, on a log directory that cannot be created,
/// and when a global subscriber is already installed.
///
/// ```no_run
/// use hearth::config::LoggingConfig;
/// use hearth::logging::init_logging;
///
/// let guard = init_logging("debug", &LoggingConfig::default()).unwrap();
/// // ... run ...
/// drop(guard);
/// ```
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level)?;

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(build_filter(level));
    let mut layers = vec![console.boxed()];

    let file = if config.local_enabled {
        let (writer, guard) = file_writer(config)?;
        let json = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_thread_ids(true)
            .with_writer(writer)
            .with_filter(build_filter(level));
        layers.push(json.boxed());
        Some((PathBuf::from(&config.local_path), guard))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| HearthError::Other(format!("Failed to install log subscriber: {e}")))?;

    tracing::debug!(
        %level,
        file_logging = config.local_enabled,
        "Logging initialized"
    );

    Ok(LoggingGuard { file })
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

fn default_directive(level: Level) -> String {
    format!("hearth={}", level.as_str().to_lowercase())
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        HearthError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            config.local_path
        ))
    })?;
    let appender = RollingFileAppender::new(
        rotation_for(&config.local_rotation),
        &config.local_path,
        LOG_FILE_PREFIX,
    );
    Ok(tracing_appender::non_blocking(appender))
}

/// Unknown names fall back to daily; config validation rejects them first
fn rotation_for(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(name: &str) -> Result<Level> {
    name.parse::<Level>().map_err(|_| {
        HearthError::Configuration(format!(
            "Invalid log level: {name}. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("trace" => Level::TRACE)]
    #[test_case("debug" => Level::DEBUG)]
    #[test_case("Info" => Level::INFO)]
    #[test_case("WARN" => Level::WARN)]
    #[test_case("error" => Level::ERROR)]
    fn test_parse_log_level(name: &str) -> Level {
        parse_log_level(name).unwrap()
    }

    #[test]
    fn test_unknown_level_is_configuration_error() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
        assert!(parse_log_level("").is_err());
        assert!(init_logging("loud", &LoggingConfig::default()).is_err());
    }

    #[test]
    fn test_default_directive_targets_crate() {
        assert_eq!(default_directive(Level::DEBUG), "hearth=debug");
        assert_eq!(default_directive(Level::WARN), "hearth=warn");
    }

    #[test]
    fn test_rotation_for() {
        assert_eq!(rotation_for("hourly"), Rotation::HOURLY);
        assert_eq!(rotation_for("never"), Rotation::NEVER);
        assert_eq!(rotation_for("daily"), Rotation::DAILY);
        assert_eq!(rotation_for("weekly"), Rotation::DAILY);
    }

    #[test]
    fn test_file_writer_creates_nested_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = LoggingConfig {
            local_enabled: true,
            local_path: nested.to_string_lossy().to_string(),
            local_rotation: "never".to_string(),
        };

        let (_writer, _guard) = file_writer(&config).unwrap();
        assert!(nested.is_dir());
    }
}
