//! Local archive cache
//!
//! Resolves whether an already-downloaded archive for a given
//! (identifier, version) pair exists under the temp root before the
//! orchestrator issues a network fetch. No hashing or integrity check is
//! performed: a filename prefix match is treated as sufficient, and only a
//! cache miss triggers a download.

use packhost_core::paths::safe_identifier;
use packhost_core::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Archive cache scoped to the host temp root
pub struct PackageCache {
    temp_dir: PathBuf,
}

impl PackageCache {
    /// Create a cache over the given temp root
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Deterministic, filesystem-safe basename for one (identifier, version)
    pub fn basename(identifier: &str, version: &str) -> String {
        format!("{}-{}", safe_identifier(identifier), safe_identifier(version))
    }

    /// Look up a cached archive for the given identifier and version
    ///
    /// Scans the temp root for any file whose name starts with the computed
    /// basename and returns the first match.
    pub fn resolve(&self, identifier: &str, version: &str) -> Result<Option<PathBuf>> {
        if !self.temp_dir.exists() {
            return Ok(None);
        }

        let prefix = Self::basename(identifier, version);
        for entry in std::fs::read_dir(&self.temp_dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }

            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                debug!(
                    "Cache hit for {} {}: {:?}",
                    identifier,
                    version,
                    entry.path()
                );
                return Ok(Some(entry.path()));
            }
        }

        Ok(None)
    }

    /// Compute the path a freshly downloaded archive must be written to
    ///
    /// `file_extension` is inferred by the downloader from the response; the
    /// basename is fixed so a later `resolve` finds the file again.
    pub fn store_path(&self, identifier: &str, version: &str, file_extension: &str) -> PathBuf {
        self.temp_dir.join(format!(
            "{}.{}",
            Self::basename(identifier, version),
            file_extension
        ))
    }

    /// Temp root this cache scans
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}

/// Infer an archive filename extension from the download response
///
/// Checks, in order: the Content-Disposition filename, the URL path, and
/// finally a random UUID so the cache entry still gets a unique suffix.
pub fn infer_file_extension(content_disposition: Option<&str>, url: &str) -> String {
    if let Some(disposition) = content_disposition {
        if let Some(name) = filename_from_disposition(disposition) {
            if let Some(ext) = extension_of(&name) {
                return ext;
            }
        }
    }

    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(segment) = parsed.path_segments().and_then(|mut s| s.next_back()) {
            if let Some(ext) = extension_of(segment) {
                return ext;
            }
        }
    }

    Uuid::new_v4().to_string()
}

fn filename_from_disposition(disposition: &str) -> Option<String> {
    disposition.split(';').find_map(|part| {
        let part = part.trim();
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
    })
}

fn extension_of(filename: &str) -> Option<String> {
    // Keep compound archive suffixes intact
    if let Some(stem) = filename.strip_suffix(".tar.gz") {
        if !stem.is_empty() {
            return Some("tar.gz".to_string());
        }
    }

    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}
