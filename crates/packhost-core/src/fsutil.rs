//! Recursive filesystem helpers
//!
//! Synchronous on purpose: directory copies and removals are invoked from
//! async code through `tokio::task::spawn_blocking`.

use crate::error::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy a directory tree
///
/// The destination is created if missing; existing files are overwritten.
/// Symlinks are followed (package archives do not carry links).
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(std::io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Remove a directory tree if it exists
///
/// Absence is a soft no-op so that retried cleanup paths stay idempotent.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path)?;
    }
    Ok(())
}
