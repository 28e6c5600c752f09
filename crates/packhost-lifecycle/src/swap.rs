//! Live directory promotion
//!
//! Promotes a staged package into the live extension directory. Install mode
//! replaces the live directory verbatim. Upgrade mode first backs up the
//! preserved-directory set (user data, runtime storage, installed local
//! dependencies), replaces the live directory, then restores each preserved
//! directory only when the new package did not ship a same-named one — a new
//! version may intentionally ship its own replacement.

use packhost_core::fsutil::{copy_dir_all, remove_dir_if_exists};
use packhost_core::paths::PRESERVED_DIRS;
use packhost_core::types::PromoteMode;
use packhost_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Performs the staged-to-live directory swap
pub struct DirectorySwapper {
    temp_dir: PathBuf,
}

impl DirectorySwapper {
    /// Create a swapper keeping upgrade backups under the given temp root
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Promote a staged package root into the live directory
    pub async fn promote(
        &self,
        staged_root: &Path,
        live_dir: &Path,
        mode: PromoteMode,
    ) -> Result<()> {
        info!("Promoting {:?} into {:?} ({})", staged_root, live_dir, mode);

        match mode {
            PromoteMode::Install => self.promote_install(staged_root, live_dir).await,
            PromoteMode::Upgrade => self.promote_upgrade(staged_root, live_dir).await,
        }
    }

    async fn promote_install(&self, staged_root: &Path, live_dir: &Path) -> Result<()> {
        let staged = staged_root.to_path_buf();
        let live = live_dir.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<()> {
            remove_dir_if_exists(&live)?;
            copy_dir_all(&staged, &live)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    async fn promote_upgrade(&self, staged_root: &Path, live_dir: &Path) -> Result<()> {
        let backup_dir = self.temp_dir.join(format!("preserve-{}", Uuid::new_v4()));
        let staged = staged_root.to_path_buf();
        let live = live_dir.to_path_buf();
        let backup = backup_dir.clone();

        let result = tokio::task::spawn_blocking(move || -> Result<()> {
            // Back up preserved directories that exist in the current live dir
            let mut preserved = Vec::new();
            for name in PRESERVED_DIRS {
                let source = live.join(name);
                if source.is_dir() {
                    debug!("Backing up preserved directory {:?}", source);
                    copy_dir_all(&source, &backup.join(name))?;
                    preserved.push(*name);
                }
            }

            remove_dir_if_exists(&live)?;
            copy_dir_all(&staged, &live)?;

            // Restore only what the new package did not ship itself
            for name in preserved {
                let target = live.join(name);
                if target.is_dir() {
                    debug!("New package ships its own {:?}, keeping it", name);
                } else {
                    debug!("Restoring preserved directory {:?}", name);
                    copy_dir_all(&backup.join(name), &target)?;
                }
            }

            Ok(())
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        // The backup is deleted regardless of the promotion outcome
        if let Err(e) = remove_dir_if_exists(&backup_dir) {
            warn!("Failed to remove upgrade backup {:?}: {}", backup_dir, e);
        }

        result
    }
}
