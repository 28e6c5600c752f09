//! Host filesystem layout
//!
//! All on-disk locations owned by the lifecycle subsystem are derived from a
//! single root:
//!
//! ```text
//! <root>/extensions/<safe-id>/{build/, .output/public/, data/, storage/, node_modules/}
//! <root>/public/web/extensions/<safe-id>/
//! <root>/tmp/                      # archive cache + scratch, never left behind
//! ```

use std::path::{Path, PathBuf};

/// Subdirectories of a live extension directory that survive an upgrade by
/// default (user data, runtime storage, installed local dependencies).
pub const PRESERVED_DIRS: &[&str] = &["data", "storage", "node_modules"];

/// Required markers for a distributable package
pub const RUNTIME_MARKERS: &[&str] = &["build", ".output/public"];

/// First-install marker filename, relative to the live data directory
pub const INSTALL_MARKER_FILE: &str = ".installed";

/// Derive a filesystem-safe name from an extension identifier or version
///
/// Every non-alphanumeric character is replaced with an underscore, so the
/// result is deterministic and safe as a directory or cache-file basename.
pub fn safe_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Derive the per-extension database schema name from an identifier
pub fn schema_name(identifier: &str) -> String {
    format!("ext_{}", safe_identifier(identifier))
}

/// Resolved filesystem layout for one host installation
#[derive(Debug, Clone)]
pub struct HostPaths {
    root: PathBuf,
}

impl HostPaths {
    /// Create a layout rooted at the given host directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all live extension directories
    pub fn extensions_dir(&self) -> PathBuf {
        self.root.join("extensions")
    }

    /// Live directory for one extension
    pub fn extension_dir(&self, identifier: &str) -> PathBuf {
        self.extensions_dir().join(safe_identifier(identifier))
    }

    /// Writable data directory inside a live extension directory
    pub fn extension_data_dir(&self, identifier: &str) -> PathBuf {
        self.extension_dir(identifier).join("data")
    }

    /// First-install marker path for one extension
    pub fn install_marker(&self, identifier: &str) -> PathBuf {
        self.extension_data_dir(identifier).join(INSTALL_MARKER_FILE)
    }

    /// Shared public root where extension web assets are published
    pub fn public_extensions_dir(&self) -> PathBuf {
        self.root.join("public").join("web").join("extensions")
    }

    /// Published web-asset directory for one extension
    pub fn public_dir(&self, identifier: &str) -> PathBuf {
        self.public_extensions_dir().join(safe_identifier(identifier))
    }

    /// Frontend build output inside a live extension directory
    pub fn package_public_dir(&self, identifier: &str) -> PathBuf {
        self.extension_dir(identifier).join(".output").join("public")
    }

    /// Dedicated temp root for cached archives and scratch directories
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Path to the enabled-extensions config document
    pub fn config_file(&self) -> PathBuf {
        self.root.join("extensions.json")
    }
}
