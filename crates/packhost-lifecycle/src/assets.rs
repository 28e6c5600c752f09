//! Web-asset publishing
//!
//! Copies an extension's frontend build output into the host's shared public
//! root, and removes it again on uninstall. Some extensions have no frontend
//! at all, so a missing source directory is a logged no-op rather than a
//! failure.

use packhost_core::fsutil::{copy_dir_all, remove_dir_if_exists};
use packhost_core::paths::safe_identifier;
use packhost_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Publishes extension web assets under the shared public root
pub struct AssetPublisher {
    public_root: PathBuf,
}

impl AssetPublisher {
    /// Create a publisher over `public/web/extensions`
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// Published directory for one extension
    pub fn target_dir(&self, identifier: &str) -> PathBuf {
        self.public_root.join(safe_identifier(identifier))
    }

    /// Copy the extension's public assets into the shared public root
    ///
    /// Replaces any prior contents. A missing source directory is a soft
    /// no-op.
    pub async fn publish(&self, identifier: &str, source_public_dir: &Path) -> Result<()> {
        if !source_public_dir.is_dir() {
            info!(
                "Extension '{}' ships no public assets ({:?} missing), skipping publish",
                identifier, source_public_dir
            );
            return Ok(());
        }

        let target = self.target_dir(identifier);
        debug!("Publishing assets {:?} -> {:?}", source_public_dir, target);

        let source = source_public_dir.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<()> {
            remove_dir_if_exists(&target)?;
            copy_dir_all(&source, &target)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    /// Remove the extension's published assets
    ///
    /// Absence is a soft no-op so retried uninstalls stay idempotent.
    pub async fn retract(&self, identifier: &str) -> Result<()> {
        let target = self.target_dir(identifier);
        if !target.exists() {
            debug!("No published assets for '{}', nothing to retract", identifier);
            return Ok(());
        }

        debug!("Retracting published assets {:?}", target);
        tokio::task::spawn_blocking(move || remove_dir_if_exists(&target))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }
}
