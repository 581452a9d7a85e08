//! Persistence of the registry document

use crate::errors::{Result, TrackerError};
use crate::models::RegistryDocument;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trait for loading and saving the whole registry document
pub trait RegistryStore {
    /// Load the current document. A store with nothing persisted yet
    /// returns an empty document.
    fn load(&self) -> Result<RegistryDocument>;

    /// Replace the persisted document with `document`
    fn save(&self, document: &RegistryDocument) -> Result<()>;
}

/// Registry stored as a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<RegistryDocument> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Data file {} not found, starting empty", self.path.display());
                return Ok(RegistryDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        let document: RegistryDocument = serde_json::from_str(&contents)?;
        debug!(
            "Loaded {} services from {}",
            document.services.len(),
            self.path.display()
        );
        Ok(document)
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        fs::write(&self.path, to_pretty_json(document)?)?;
        debug!(
            "Saved {} services to {}",
            document.services.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryStore {
    document: RefCell<RegistryDocument>,
    saves: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: RegistryDocument) -> Self {
        Self {
            document: RefCell::new(document),
            saves: Cell::new(0),
        }
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn snapshot(&self) -> RegistryDocument {
        self.document.borrow().clone()
    }
}

impl RegistryStore for InMemoryStore {
    fn load(&self) -> Result<RegistryDocument> {
        Ok(self.document.borrow().clone())
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        *self.document.borrow_mut() = document.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Serialize with four-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits UTF-8, so this never fails in practice
    String::from_utf8(out)
        .map_err(|e| TrackerError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceRecord, ServiceStatus};
    use crate::registry::ServiceRegistry;
    use chrono::NaiveDate;

    fn record(id: &str, name: &str) -> ServiceRecord {
        let now = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        ServiceRecord::new(id.to_string(), name.to_string(), ServiceStatus::Healthy, now)
    }

    #[test]
    fn test_missing_file_is_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let document = store.load().unwrap();
        assert!(document.services.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("services.json"));

        let mut unhealthy = record("b", "Beta");
        let later = unhealthy.last_updated.to_datetime().unwrap() + chrono::Duration::minutes(5);
        unhealthy.set_status(ServiceStatus::Unhealthy, later);
        let document = RegistryDocument {
            services: vec![record("c", "Gamma"), unhealthy, record("a", "Alpha")],
            ..Default::default()
        };

        store.save(&document).unwrap();
        assert_eq!(store.load().unwrap(), document);
    }

    #[test]
    fn test_saved_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("services.json"));

        store
            .save(&RegistryDocument {
                services: vec![record("a", "Alpha")],
                ..Default::default()
            })
            .unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("{\n    \"services\": [\n        {"));
        assert!(raw.contains("\"last_updated\": \"2024-05-20 12:30:00\""));
        assert!(raw.contains("\"outage_cause\": null"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TrackerError::Json(_)));
    }

    #[test]
    fn test_foreign_layout_survives_no_op_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        let raw = serde_json::json!({
            "services": [{
                "service_id": "a",
                "service_name": "Alpha",
                "status": "healthy",
                "last_updated": "2024-03-01T10:00:00",
                "alerts": [],
                "outage_cause": null,
                "owner": "ops"
            }],
            "schema": 2
        });
        fs::write(&path, raw.to_string()).unwrap();

        let registry = ServiceRegistry::new(JsonFileStore::new(&path));
        assert_eq!(registry.list().unwrap().len(), 1);
        assert_eq!(registry.delete("zzz").unwrap(), 0);

        let after: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(after, raw);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("services.json"));

        let err = store.save(&RegistryDocument::default()).unwrap_err();
        assert!(matches!(err, TrackerError::Io(_)));
    }

    #[test]
    fn test_non_ascii_names_are_written_unescaped() {
        let json = to_pretty_json(&record("cafe", "Café Menü")).unwrap();
        assert!(json.contains("\"service_name\": \"Café Menü\""));
        assert!(!json.contains("\\u00e9"));
    }

    #[test]
    fn test_in_memory_store_counts_saves() {
        let store = InMemoryStore::new();
        assert!(store.load().unwrap().services.is_empty());

        let document = RegistryDocument {
            services: vec![record("a", "Alpha")],
            ..Default::default()
        };
        store.save(&document).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot(), document);
    }
}
