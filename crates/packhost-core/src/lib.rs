//! Core library for Packhost
//!
//! This crate provides:
//! - The lifecycle error taxonomy
//! - Shared extension types (records, origins, promote modes)
//! - Host filesystem layout and safe-identifier derivation
//! - Recursive directory copy/remove helpers

pub mod error;
pub mod fsutil;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use paths::{safe_identifier, HostPaths};

use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// container setups that remap HOME behave consistently with shell scripts.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}
