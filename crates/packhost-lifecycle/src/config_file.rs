//! Enabled-extensions config document
//!
//! A JSON document on disk listing every enabled extension, grouped into
//! named sections. The host reads it at boot to decide what to load; the
//! lifecycle orchestrator appends an entry after a successful
//! install/scaffold and removes it during uninstall.

use chrono::Utc;
use packhost_core::types::ConfigEntry;
use packhost_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default section for market-installed and scaffolded extensions
pub const DEFAULT_SECTION: &str = "extensions";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    sections: BTreeMap<String, BTreeMap<String, ConfigEntry>>,
}

/// On-disk enabled-extensions config
///
/// Mutations load, modify, and rewrite the whole document under a lock so
/// concurrent lifecycle operations on different identifiers cannot clobber
/// each other's writes.
pub struct EnabledConfig {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EnabledConfig {
    /// Create a config over the given document path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ConfigDocument> {
        if !self.path.exists() {
            return Ok(ConfigDocument::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, doc: &ConfigDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Add (or replace) an entry for an identifier under a section
    pub async fn add_entry(
        &self,
        identifier: &str,
        entry: ConfigEntry,
        section: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load()?;
        doc.sections
            .entry(section.to_string())
            .or_default()
            .insert(identifier.to_string(), entry);

        info!("Added config entry for '{}' in section '{}'", identifier, section);
        self.save(&doc)
    }

    /// Remove the entry for an identifier, searching all sections
    ///
    /// Absence is a soft no-op so retried uninstalls stay idempotent.
    pub async fn remove_entry(&self, identifier: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load()?;
        let mut removed = false;
        for entries in doc.sections.values_mut() {
            removed |= entries.remove(identifier).is_some();
        }

        if removed {
            info!("Removed config entry for '{}'", identifier);
            self.save(&doc)
        } else {
            debug!("No config entry for '{}', nothing to remove", identifier);
            Ok(())
        }
    }

    /// Look up the entry for an identifier in any section
    pub async fn find_entry(&self, identifier: &str) -> Result<Option<ConfigEntry>> {
        let doc = self.load()?;
        Ok(doc
            .sections
            .values()
            .find_map(|entries| entries.get(identifier))
            .cloned())
    }

    /// List identifiers of enabled entries across all sections
    pub async fn enabled_identifiers(&self) -> Result<Vec<String>> {
        let doc = self.load()?;
        Ok(doc
            .sections
            .values()
            .flat_map(|entries| {
                entries
                    .iter()
                    .filter(|(_, e)| e.enabled)
                    .map(|(id, _)| id.clone())
            })
            .collect())
    }
}

/// Build a config entry from a manifest snapshot
pub fn make_entry(manifest: serde_json::Value, is_local: bool) -> ConfigEntry {
    ConfigEntry {
        manifest,
        is_local,
        enabled: true,
        installed_at: Utc::now(),
    }
}
