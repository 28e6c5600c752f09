//! Error types for packhost-core
//!
//! The taxonomy distinguishes fatal conditions (anything that would leave
//! on-disk or record state inconsistent if skipped) from non-fatal ones.
//! Non-fatal conditions (schema drop, registry notify, asset retract on
//! uninstall, process reload) are logged at the call site and never surface
//! through this type.

use thiserror::Error;

/// Result type alias using packhost-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle error types for Packhost
#[derive(Error, Debug)]
pub enum Error {
    /// Archive download failed
    #[error("Download failed for extension '{identifier}': {reason}")]
    DownloadFailed { identifier: String, reason: String },

    /// Package is missing required marker directories
    #[error("Invalid package structure at {path}: missing {missing}")]
    InvalidPackageStructure { path: String, missing: String },

    /// Install/scaffold target already present
    #[error("Extension '{identifier}' already exists")]
    AlreadyExists { identifier: String },

    /// Upgrade/uninstall target absent
    #[error("Extension '{identifier}' not found")]
    NotFound { identifier: String },

    /// Shared dependency installation failed
    #[error("Dependency install failed for extension '{identifier}': {reason}")]
    DependencyInstallFailed { identifier: String, reason: String },

    /// In-place build failed during scaffolding
    #[error("Build failed for extension '{identifier}': {reason}")]
    BuildFailed { identifier: String, reason: String },

    /// Registry returned no usable version for the identifier
    #[error("No published versions found for extension '{identifier}'")]
    NoVersions { identifier: String },

    /// Invalid semver version
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Metadata store error
    #[error("Metadata store error: {message}")]
    Store { message: String },

    /// Subprocess invocation error
    #[error("Subprocess error: {message}")]
    Subprocess { message: String },

    /// Registry client error
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a download failed error
    pub fn download_failed(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DownloadFailed {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid package structure error
    pub fn invalid_structure(path: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::InvalidPackageStructure {
            path: path.into(),
            missing: missing.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            identifier: identifier.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a dependency install failed error
    pub fn dependency_install_failed(
        identifier: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DependencyInstallFailed {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a build failed error
    pub fn build_failed(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BuildFailed {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a metadata store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a subprocess error
    pub fn subprocess(message: impl Into<String>) -> Self {
        Self::Subprocess {
            message: message.into(),
        }
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }
}
