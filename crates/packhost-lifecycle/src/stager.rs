//! Archive staging
//!
//! Extracts a package archive into a uniquely-named scratch directory under
//! the host temp root, locates the real package root inside it (archives
//! often carry one extra wrapping folder), and validates the root against
//! the required marker layout. The scratch directory is always removed once
//! the operation finishes, whether the caller succeeds or fails downstream.

use packhost_core::paths::RUNTIME_MARKERS;
use packhost_core::types::PackageKind;
use packhost_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A staged package: exploded archive plus resolved package root
///
/// Owns the scratch directory for the duration of one lifecycle operation.
/// Call [`StagedPackage::cleanup`] when done; `Drop` removes the scratch
/// directory as a fallback on early-return paths so extraction never leaves
/// residue.
pub struct StagedPackage {
    scratch: PathBuf,
    root: PathBuf,
}

impl StagedPackage {
    /// Resolved package root inside the scratch directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the scratch directory
    pub async fn cleanup(mut self) -> Result<()> {
        let scratch = std::mem::take(&mut self.scratch);
        tokio::task::spawn_blocking(move || packhost_core::fsutil::remove_dir_if_exists(&scratch))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }
}

impl Drop for StagedPackage {
    fn drop(&mut self) {
        if self.scratch.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.scratch) {
            if self.scratch.exists() {
                warn!("Failed to remove staging directory {:?}: {}", self.scratch, e);
            }
        }
    }
}

/// Extracts archives and resolves/validates package roots
pub struct ArchiveStager {
    temp_dir: PathBuf,
}

impl ArchiveStager {
    /// Create a stager extracting under the given temp root
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Extract an archive and resolve its package root
    ///
    /// Root resolution checks, in order: the scratch directory itself, then
    /// each immediate subdirectory; the first directory satisfying the
    /// marker set for `kind` wins. Fails with `InvalidPackageStructure` when
    /// no directory qualifies, removing the scratch directory before
    /// returning.
    pub async fn stage(&self, archive: &Path, kind: PackageKind) -> Result<StagedPackage> {
        let scratch = self.temp_dir.join(format!("stage-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch).await?;

        debug!("Extracting {:?} into {:?}", archive, scratch);

        let archive_path = archive.to_path_buf();
        let extract_dest = scratch.clone();
        let extracted = tokio::task::spawn_blocking(move || -> Result<()> {
            let file = std::fs::File::open(&archive_path)?;
            let decoder = flate2::read::GzDecoder::new(file);
            let mut archive = tar::Archive::new(decoder);
            archive.unpack(&extract_dest)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        if let Err(e) = extracted {
            let _ = std::fs::remove_dir_all(&scratch);
            return Err(e);
        }

        match Self::resolve_root(&scratch, kind)? {
            Some(root) => {
                debug!("Resolved package root: {:?}", root);
                Ok(StagedPackage { scratch, root })
            }
            None => {
                let _ = std::fs::remove_dir_all(&scratch);
                Err(Error::invalid_structure(
                    archive.display().to_string(),
                    missing_markers_label(kind),
                ))
            }
        }
    }

    /// Find the first directory satisfying the marker set for `kind`
    fn resolve_root(scratch: &Path, kind: PackageKind) -> Result<Option<PathBuf>> {
        if has_markers(scratch, kind) {
            return Ok(Some(scratch.to_path_buf()));
        }

        for entry in std::fs::read_dir(scratch)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && has_markers(&path, kind) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}

/// Check whether a directory satisfies the marker layout for `kind`
pub fn has_markers(dir: &Path, kind: PackageKind) -> bool {
    match kind {
        PackageKind::Runtime => RUNTIME_MARKERS
            .iter()
            .all(|marker| dir.join(marker).is_dir()),
        PackageKind::Template => dir.join("package.json").is_file(),
    }
}

fn missing_markers_label(kind: PackageKind) -> String {
    match kind {
        PackageKind::Runtime => RUNTIME_MARKERS.join(", "),
        PackageKind::Template => "package.json".to_string(),
    }
}
