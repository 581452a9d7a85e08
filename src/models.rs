//! Service record data structures and utilities

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layout used in the persisted document
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServiceRecord {
    pub service_id: String,
    pub service_name: String,
    pub status: ServiceStatus,
    pub last_updated: Timestamp,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub outage_cause: Option<String>,
    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub message: String,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A timestamp as stored in the document. Values in other layouts are kept
/// verbatim and only parsed on demand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort parse of the stored value
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(&self.0)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp(value.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status of a service. Values other than `healthy` and `unhealthy`
/// are accepted and kept as written.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ServiceStatus {
    #[default]
    Healthy,
    Unhealthy,
    Other(String),
}

impl ServiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Unhealthy => "unhealthy",
            ServiceStatus::Other(s) => s,
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        self.as_str() == "unhealthy"
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ServiceStatus {
    fn from(s: &str) -> Self {
        match s {
            "healthy" => ServiceStatus::Healthy,
            "unhealthy" => ServiceStatus::Unhealthy,
            other => ServiceStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for ServiceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "healthy" => ServiceStatus::Healthy,
            "unhealthy" => ServiceStatus::Unhealthy,
            _ => ServiceStatus::Other(s),
        }
    }
}

impl From<ServiceStatus> for String {
    fn from(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// The full persisted registry document
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistryDocument {
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceRecord {
    pub fn new(
        service_id: String,
        service_name: String,
        status: ServiceStatus,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            service_id,
            service_name,
            status,
            last_updated: now.into(),
            alerts: Vec::new(),
            outage_cause: None,
            extra: Map::new(),
        }
    }

    /// Set a new status, recording an alert when it becomes unhealthy
    pub fn set_status(&mut self, status: ServiceStatus, now: NaiveDateTime) {
        self.status = status;
        self.last_updated = now.into();

        if self.status.is_unhealthy() {
            self.alerts.push(Alert::unhealthy(&self.service_name, now));
        }
    }
}

impl Alert {
    pub fn unhealthy(service_name: &str, now: NaiveDateTime) -> Self {
        Self {
            message: format!("Service {} is unhealthy!", service_name),
            timestamp: now.into(),
            extra: Map::new(),
        }
    }
}

/// Source of the current time for record timestamps
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone, truncated to whole seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(ServiceStatus::from("healthy"), ServiceStatus::Healthy);
        assert_eq!(ServiceStatus::from("unhealthy"), ServiceStatus::Unhealthy);
        assert_eq!(
            ServiceStatus::from("Unhealthy"),
            ServiceStatus::Other("Unhealthy".to_string())
        );
        assert_eq!(ServiceStatus::from("degraded").to_string(), "degraded");
    }

    #[test]
    fn test_record_serialization_format() {
        let record = ServiceRecord::new(
            "svc-1".to_string(),
            "Billing".to_string(),
            ServiceStatus::Healthy,
            at(9, 5, 7),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["last_updated"], "2024-03-01 09:05:07");
        assert_eq!(json["alerts"], serde_json::json!([]));
        assert!(json["outage_cause"].is_null());
    }

    #[test]
    fn test_unknown_status_survives_parsing() {
        let raw = r#"{
            "service_id": "a",
            "service_name": "A",
            "status": "maintenance",
            "last_updated": "2024-03-01 10:00:00",
            "alerts": [],
            "outage_cause": null
        }"#;

        let record: ServiceRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.status, ServiceStatus::Other("maintenance".to_string()));
        assert_eq!(record.last_updated.to_datetime(), Some(at(10, 0, 0)));
    }

    #[test]
    fn test_timestamp_parsing_is_lenient() {
        let iso: Timestamp =
            serde_json::from_value(serde_json::json!("2024-03-01T10:00:00")).unwrap();
        assert_eq!(iso.to_datetime(), Some(at(10, 0, 0)));

        let free: Timestamp = serde_json::from_value(serde_json::json!("yesterday")).unwrap();
        assert_eq!(free.as_str(), "yesterday");
        assert_eq!(free.to_datetime(), None);
        assert_eq!(serde_json::to_value(&free).unwrap(), "yesterday");
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let raw = r#"{
            "service_id": "a",
            "service_name": "A",
            "status": "healthy",
            "last_updated": "2024-03-01 10:00:00",
            "alerts": [{"message": "m", "timestamp": "t", "source": "pager"}],
            "outage_cause": null,
            "owner": "ops"
        }"#;

        let record: ServiceRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.extra["owner"], "ops");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["owner"], "ops");
        assert_eq!(json["alerts"][0]["source"], "pager");
        assert!(json["outage_cause"].is_null());
    }

    #[test]
    fn test_unhealthy_check_uses_status_text() {
        assert!(ServiceStatus::Unhealthy.is_unhealthy());
        assert!(ServiceStatus::Other("unhealthy".to_string()).is_unhealthy());
        assert!(!ServiceStatus::Other("Unhealthy".to_string()).is_unhealthy());

        let mut record = ServiceRecord::new(
            "svc-1".to_string(),
            "Billing".to_string(),
            ServiceStatus::Healthy,
            at(9, 0, 0),
        );
        record.set_status(ServiceStatus::Other("unhealthy".to_string()), at(9, 1, 0));
        assert_eq!(record.alerts.len(), 1);
    }

    #[test]
    fn test_set_status_alerts_only_when_unhealthy() {
        let mut record = ServiceRecord::new(
            "svc-1".to_string(),
            "Billing".to_string(),
            ServiceStatus::Healthy,
            at(9, 0, 0),
        );

        record.set_status(ServiceStatus::Healthy, at(9, 1, 0));
        assert!(record.alerts.is_empty());

        record.set_status(ServiceStatus::Unhealthy, at(9, 2, 0));
        record.set_status(ServiceStatus::Unhealthy, at(9, 3, 0));
        assert_eq!(record.alerts.len(), 2);
        assert_eq!(record.alerts[0].message, "Service Billing is unhealthy!");
        assert_eq!(record.alerts[1].timestamp, Timestamp::from(at(9, 3, 0)));
        assert_eq!(record.last_updated.as_str(), "2024-03-01 09:03:00");
    }
}
