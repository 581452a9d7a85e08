//! Command-line arguments and one-shot command execution

use crate::config::Config;
use crate::errors::Result;
use crate::models::{Clock, ServiceStatus};
use crate::registry::ServiceRegistry;
use crate::shell::{self, Shell};
use crate::storage::{RegistryStore, to_pretty_json};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track service health in a JSON file", long_about = None)]
pub struct Args {
    /// Path to the service data file (overrides SERVICE_DATA_FILE)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Command to run; starts the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive menu
    Shell,
    /// Register a new service
    Create {
        service_id: String,
        service_name: String,
        #[arg(long, default_value = "healthy")]
        status: String,
    },
    /// Print every service record
    List,
    /// Change the status of a service
    Update { service_id: String, status: String },
    /// Remove every record with the given id
    Delete { service_id: String },
    /// Record the outage cause for an unhealthy service
    Analyze { service_id: String },
}

impl Args {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> Config {
        Config::from_env().with_overrides(
            self.data_file.clone(),
            self.log_level.clone(),
            self.json_logs,
        )
    }
}

/// Execute a command against `registry`, reading shell input from `input`
pub fn execute<S, C, R, W>(
    command: Commands,
    registry: &ServiceRegistry<S, C>,
    input: R,
    mut output: W,
) -> Result<()>
where
    S: RegistryStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    match command {
        Commands::Shell => Shell::new(registry, input, output).run()?,
        Commands::Create {
            service_id,
            service_name,
            status,
        } => {
            let record = registry.create(&service_id, &service_name, ServiceStatus::from(status))?;
            writeln!(output, "{}", shell::created_message(&record))?;
        }
        Commands::List => {
            for record in registry.list()? {
                writeln!(output, "{}", to_pretty_json(&record)?)?;
            }
        }
        Commands::Update { service_id, status } => {
            let status = ServiceStatus::from(status);
            let outcome = registry.update_status(&service_id, status.clone())?;
            writeln!(output, "{}", shell::update_message(&service_id, &status, &outcome))?;
        }
        Commands::Delete { service_id } => {
            registry.delete(&service_id)?;
            writeln!(output, "{}", shell::deleted_message(&service_id))?;
        }
        Commands::Analyze { service_id } => {
            let analysis = registry.analyze_outage(&service_id)?;
            writeln!(output, "{}", shell::analysis_message(&service_id, &analysis))?;
        }
    }

    Ok(())
}
