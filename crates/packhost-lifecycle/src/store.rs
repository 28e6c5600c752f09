//! Extension metadata store boundary
//!
//! The orchestrator mutates extension records only through this trait; the
//! host's relational persistence sits behind it. `JsonMetadataStore` is the
//! bundled document-on-disk implementation used by the CLI and by tests.

use async_trait::async_trait;
use packhost_core::types::ExtensionRecord;
use packhost_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// CRUD over extension metadata records, keyed by identifier
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Find a record by identifier
    async fn find(&self, identifier: &str) -> Result<Option<ExtensionRecord>>;

    /// Create a record; fails if the identifier already exists
    async fn create(&self, record: ExtensionRecord) -> Result<()>;

    /// Update an existing record in place; fails if absent
    async fn update(&self, record: ExtensionRecord) -> Result<()>;

    /// Delete a record; fails if absent
    async fn delete(&self, identifier: &str) -> Result<()>;

    /// List all records
    async fn list(&self) -> Result<Vec<ExtensionRecord>>;
}

/// JSON-document-backed metadata store
///
/// The whole record set is kept in memory and re-serialized to disk on each
/// mutation; the parent directory is created on demand.
pub struct JsonMetadataStore {
    path: PathBuf,
    records: Mutex<HashMap<String, ExtensionRecord>>,
}

impl JsonMetadataStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let list: Vec<ExtensionRecord> = serde_json::from_str(&content)?;
            list.into_iter()
                .map(|r| (r.identifier.clone(), r))
                .collect()
        } else {
            HashMap::new()
        };

        debug!("Loaded metadata store from {:?} ({} records)", path, records.len());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn save(&self, records: &HashMap<String, ExtensionRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut list: Vec<&ExtensionRecord> = records.values().collect();
        list.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        let content = serde_json::to_string_pretty(&list)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn find(&self, identifier: &str) -> Result<Option<ExtensionRecord>> {
        Ok(self.records.lock().await.get(identifier).cloned())
    }

    async fn create(&self, record: ExtensionRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.identifier) {
            return Err(Error::store(format!(
                "record for '{}' already exists",
                record.identifier
            )));
        }

        info!("Creating metadata record for '{}'", record.identifier);
        records.insert(record.identifier.clone(), record);
        self.save(&records)
    }

    async fn update(&self, record: ExtensionRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        if !records.contains_key(&record.identifier) {
            return Err(Error::store(format!(
                "record for '{}' does not exist",
                record.identifier
            )));
        }

        info!(
            "Updating metadata record for '{}' (version {})",
            record.identifier, record.version
        );
        records.insert(record.identifier.clone(), record);
        self.save(&records)
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        if records.remove(identifier).is_none() {
            return Err(Error::store(format!(
                "record for '{}' does not exist",
                identifier
            )));
        }

        info!("Deleted metadata record for '{}'", identifier);
        self.save(&records)
    }

    async fn list(&self) -> Result<Vec<ExtensionRecord>> {
        let records = self.records.lock().await;
        let mut list: Vec<ExtensionRecord> = records.values().cloned().collect();
        list.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(list)
    }
}

/// Reload a store from disk (used by tests to check persistence)
impl JsonMetadataStore {
    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }
}
