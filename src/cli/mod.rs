//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Hearth using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Hearth - Family document store client for Azure Cosmos DB
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(version, about, long_about = None)]
#[command(author = "Hearth Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hearth.toml", env = "HEARTH_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HEARTH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the getting-started walkthrough
    Demo(commands::demo::DemoArgs),

    /// Run a query and print each document as JSON
    Query(commands::query::QueryArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeStrategy;

    #[test]
    fn test_cli_parse_demo() {
        let cli = Cli::parse_from(["hearth", "demo"]);
        assert_eq!(cli.config, "hearth.toml");
        match cli.command {
            Commands::Demo(args) => {
                assert!(!args.in_memory);
                assert!(!args.cleanup);
                assert_eq!(args.strategy, None);
            }
            other => panic!("expected demo, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_demo_flags() {
        let cli = Cli::parse_from([
            "hearth",
            "demo",
            "--in-memory",
            "--strategy",
            "raw-stream",
            "--cleanup",
        ]);
        match cli.command {
            Commands::Demo(args) => {
                assert!(args.in_memory);
                assert!(args.cleanup);
                assert_eq!(args.strategy, Some(ProbeStrategy::RawStream));
            }
            other => panic!("expected demo, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["hearth", "demo", "--strategy", "stream"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["hearth", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["hearth", "--log-level", "debug", "demo"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_query() {
        let cli = Cli::parse_from([
            "hearth",
            "query",
            "SELECT * FROM c",
            "--partition-key",
            "Wakefield",
        ]);
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.query, "SELECT * FROM c");
                assert_eq!(args.partition_key.as_deref(), Some("Wakefield"));
            }
            other => panic!("expected query, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["hearth", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
