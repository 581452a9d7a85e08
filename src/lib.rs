//! Service Health Tracker Library
//!
//! This library keeps a registry of services and their health status in a
//! JSON document, with an interactive shell and one-shot commands on top.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod registry;
pub mod shell;
pub mod storage;

pub use config::Config;
pub use errors::{Result, TrackerError};
pub use models::{
    Alert, Clock, RegistryDocument, ServiceRecord, ServiceStatus, SystemClock, Timestamp,
};
pub use registry::{OUTAGE_CAUSE, OutageAnalysis, ServiceRegistry, UpdateOutcome};
pub use storage::{InMemoryStore, JsonFileStore, RegistryStore};
