//! Demo command implementation
//!
//! Runs the getting-started walkthrough against Azure Cosmos DB, or against
//! an in-process store with `--in-memory`.

use super::{exit_code_for, EXIT_CONFIG, EXIT_CONNECTION, EXIT_SUCCESS};
use crate::adapters::database::{create_document_store, DocumentStore};
use crate::adapters::memory::InMemoryStore;
use crate::config::{load_config, read_config, HearthConfig, ProbeStrategy};
use crate::core::{run_demo, DemoReport, SessionSettings};
use clap::Args;
use std::path::Path;

/// Arguments for the demo command
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Use an in-process store instead of Cosmos DB
    #[arg(long)]
    pub in_memory: bool,

    /// Override the writer's existence probe (typed or raw-stream)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<ProbeStrategy>,

    /// Delete Wakefield.7 and the database afterwards
    #[arg(long)]
    pub cleanup: bool,
}

impl DemoArgs {
    /// Execute the demo command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(in_memory = self.in_memory, "Starting demo command");

        let config = match self.resolve_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut settings = SessionSettings::from(&config);
        if let Some(strategy) = self.strategy {
            tracing::info!(strategy = %strategy, "Overriding probe strategy from CLI");
            settings.probe_strategy = strategy;
        }

        if self.in_memory {
            return Ok(self.run(InMemoryStore::new(), &settings).await);
        }

        let store = match create_document_store(&config) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Cosmos DB client");
                eprintln!("Failed to connect: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };
        Ok(self.run(store, &settings).await)
    }

    /// In-memory runs only need a locally valid config; the file is optional
    fn resolve_config(&self, config_path: &str) -> crate::domain::Result<HearthConfig> {
        if !self.in_memory {
            return load_config(config_path);
        }

        let config = if Path::new(config_path).exists() {
            read_config(config_path)?
        } else {
            tracing::debug!(config_path = %config_path, "No config file, using defaults");
            HearthConfig::default()
        };
        crate::config::loader::validate(&config, HearthConfig::validate_local)?;
        Ok(config)
    }

    async fn run<S: DocumentStore>(&self, store: S, settings: &SessionSettings) -> i32 {
        println!("Beginning operations...");
        println!();

        match run_demo(store, settings, self.cleanup).await {
            Ok(report) => {
                print_report(&report);
                EXIT_SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Demo failed");
                eprintln!("Demo failed: {e}");
                exit_code_for(&e)
            }
        }
    }
}

fn print_report(report: &DemoReport) {
    for (name, outcome) in [("Andersen.1", &report.andersen), ("Wakefield.7", &report.wakefield)] {
        if outcome.created {
            println!(
                "Created item {name}. Operation consumed {} RUs.",
                outcome.request_charge
            );
        } else {
            println!("Item {name} already exists");
        }
    }
    println!();

    for family in &report.query_results {
        println!("Read {family}");
    }
    println!();

    println!("Updated Family [Wakefield,Wakefield.7]. Body is now: {}", report.updated);

    if report.cleaned_up {
        println!("Deleted Family [Wakefield,Wakefield.7]");
        println!("Deleted database");
    }
    println!();
    println!("End of demo");
}
