//! Service registry operations over a persisted document

use crate::errors::Result;
use crate::models::{Clock, ServiceRecord, ServiceStatus, SystemClock};
use crate::storage::RegistryStore;
use tracing::{info, instrument, warn};

/// Placeholder cause recorded by outage analysis
pub const OUTAGE_CAUSE: &str = "Network latency";

/// Result of a status update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(ServiceRecord),
    NotFound,
}

/// Result of an outage analysis
#[derive(Debug, Clone, PartialEq)]
pub enum OutageAnalysis {
    /// The service is unhealthy and the cause was recorded
    Cause(String),
    /// The service is not unhealthy
    NoOutage,
    NotFound,
}

/// Registry of tracked services. Every operation reloads the document from
/// the store, and mutating operations write it back in full.
pub struct ServiceRegistry<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: RegistryStore> ServiceRegistry<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: RegistryStore, C: Clock> ServiceRegistry<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a new service record. Duplicate ids are allowed.
    #[instrument(skip(self))]
    pub fn create(
        &self,
        service_id: &str,
        service_name: &str,
        status: ServiceStatus,
    ) -> Result<ServiceRecord> {
        let mut document = self.store.load()?;
        let record = ServiceRecord::new(
            service_id.to_string(),
            service_name.to_string(),
            status,
            self.clock.now(),
        );

        document.services.push(record.clone());
        self.store.save(&document)?;

        info!("Created service {} ({})", service_id, service_name);
        Ok(record)
    }

    /// All records in storage order
    pub fn list(&self) -> Result<Vec<ServiceRecord>> {
        Ok(self.store.load()?.services)
    }

    /// Update the status of the first record matching `service_id`
    #[instrument(skip(self))]
    pub fn update_status(&self, service_id: &str, status: ServiceStatus) -> Result<UpdateOutcome> {
        let mut document = self.store.load()?;

        let Some(record) = document
            .services
            .iter_mut()
            .find(|s| s.service_id == service_id)
        else {
            warn!("Status update for unknown service {}", service_id);
            return Ok(UpdateOutcome::NotFound);
        };

        record.set_status(status, self.clock.now());
        let updated = record.clone();
        self.store.save(&document)?;

        info!("Service {} status set to {}", service_id, updated.status);
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Remove every record matching `service_id`, returning how many were removed.
    /// The document is saved even when nothing matched.
    #[instrument(skip(self))]
    pub fn delete(&self, service_id: &str) -> Result<usize> {
        let mut document = self.store.load()?;

        let before = document.services.len();
        document.services.retain(|s| s.service_id != service_id);
        let removed = before - document.services.len();

        self.store.save(&document)?;

        info!("Deleted {} record(s) for service {}", removed, service_id);
        Ok(removed)
    }

    /// Annotate an unhealthy service with the fixed outage cause
    #[instrument(skip(self))]
    pub fn analyze_outage(&self, service_id: &str) -> Result<OutageAnalysis> {
        let mut document = self.store.load()?;

        let Some(record) = document
            .services
            .iter_mut()
            .find(|s| s.service_id == service_id)
        else {
            warn!("Outage analysis for unknown service {}", service_id);
            return Ok(OutageAnalysis::NotFound);
        };

        if !record.status.is_unhealthy() {
            return Ok(OutageAnalysis::NoOutage);
        }

        record.outage_cause = Some(OUTAGE_CAUSE.to_string());
        self.store.save(&document)?;

        info!("Recorded outage cause for service {}", service_id);
        Ok(OutageAnalysis::Cause(OUTAGE_CAUSE.to_string()))
    }
}
