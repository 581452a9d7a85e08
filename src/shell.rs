//! Interactive menu shell driving the service registry

use crate::errors::Result;
use crate::models::{Clock, ServiceRecord, ServiceStatus};
use crate::registry::{OutageAnalysis, ServiceRegistry, UpdateOutcome};
use crate::storage::{RegistryStore, to_pretty_json};
use std::io::{BufRead, Write};
use tracing::debug;

const MENU: &str = "\nService Health Dashboard
1. Create Service
2. Read Services
3. Update Service Status
4. Delete Service
5. Analyse Outage Cause
6. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Create,
    Read,
    UpdateStatus,
    Delete,
    AnalyseOutage,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Create),
            "2" => Some(MenuChoice::Read),
            "3" => Some(MenuChoice::UpdateStatus),
            "4" => Some(MenuChoice::Delete),
            "5" => Some(MenuChoice::AnalyseOutage),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Line-oriented shell over any input and output stream
pub struct Shell<'a, S, C, R, W> {
    registry: &'a ServiceRegistry<S, C>,
    input: R,
    output: W,
}

impl<'a, S, C, R, W> Shell<'a, S, C, R, W>
where
    S: RegistryStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    pub fn new(registry: &'a ServiceRegistry<S, C>, input: R, output: W) -> Self {
        Self {
            registry,
            input,
            output,
        }
    }

    /// Run until the user exits or input is exhausted
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;

            let Some(choice) = self.prompt("Enter your choice: ")? else {
                debug!("Input closed, leaving shell");
                return Ok(());
            };

            let Some(choice) = MenuChoice::parse(&choice) else {
                writeln!(self.output, "Invalid choice. Please try again.")?;
                continue;
            };

            if choice == MenuChoice::Exit {
                writeln!(self.output, "Exiting...")?;
                return Ok(());
            }

            if !self.dispatch(choice)? {
                debug!("Input closed mid-command, leaving shell");
                return Ok(());
            }
        }
    }

    /// Handle one menu choice. Returns false when input ran out while prompting.
    fn dispatch(&mut self, choice: MenuChoice) -> Result<bool> {
        match choice {
            MenuChoice::Create => {
                let Some(id) = self.prompt("Enter Service ID: ")? else {
                    return Ok(false);
                };
                let Some(name) = self.prompt("Enter Service Name: ")? else {
                    return Ok(false);
                };
                let record = self.registry.create(&id, &name, ServiceStatus::default())?;
                writeln!(self.output, "{}", created_message(&record))?;
            }
            MenuChoice::Read => {
                for record in self.registry.list()? {
                    writeln!(self.output, "{}", to_pretty_json(&record)?)?;
                }
            }
            MenuChoice::UpdateStatus => {
                let Some(id) = self.prompt("Enter Service ID: ")? else {
                    return Ok(false);
                };
                let Some(status) = self.prompt("Enter new status (healthy/unhealthy): ")? else {
                    return Ok(false);
                };
                let status = ServiceStatus::from(status);
                let outcome = self.registry.update_status(&id, status.clone())?;
                writeln!(self.output, "{}", update_message(&id, &status, &outcome))?;
            }
            MenuChoice::Delete => {
                let Some(id) = self.prompt("Enter Service ID: ")? else {
                    return Ok(false);
                };
                self.registry.delete(&id)?;
                writeln!(self.output, "{}", deleted_message(&id))?;
            }
            MenuChoice::AnalyseOutage => {
                let Some(id) = self.prompt("Enter Service ID: ")? else {
                    return Ok(false);
                };
                let analysis = self.registry.analyze_outage(&id)?;
                writeln!(self.output, "{}", analysis_message(&id, &analysis))?;
            }
            MenuChoice::Exit => {}
        }

        Ok(true)
    }

    /// Print a prompt and read one line without its terminator.
    /// Returns None at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

pub fn created_message(record: &ServiceRecord) -> String {
    format!(
        "Service '{}' (ID: {}) created successfully.",
        record.service_name, record.service_id
    )
}

pub fn update_message(service_id: &str, status: &ServiceStatus, outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Updated(_) => {
            format!("Service ID {} status updated to '{}'.", service_id, status)
        }
        UpdateOutcome::NotFound => not_found_message(service_id),
    }
}

pub fn deleted_message(service_id: &str) -> String {
    format!("Service ID {} deleted successfully.", service_id)
}

pub fn analysis_message(service_id: &str, analysis: &OutageAnalysis) -> String {
    match analysis {
        OutageAnalysis::Cause(cause) => {
            format!("Outage cause for Service ID {}: {}", service_id, cause)
        }
        OutageAnalysis::NoOutage => {
            format!("Service ID {} is healthy. No outage detected.", service_id)
        }
        OutageAnalysis::NotFound => not_found_message(service_id),
    }
}

fn not_found_message(service_id: &str) -> String {
    format!("Service ID {} not found.", service_id)
}
