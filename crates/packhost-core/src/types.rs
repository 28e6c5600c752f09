//! Shared extension types
//!
//! These types flow between the lifecycle orchestrator and its external
//! collaborators (metadata store, registry client, config file). Descriptive
//! metadata fields are opaque to the lifecycle logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an installed extension is active in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionStatus {
    Enabled,
    Disabled,
}

/// Where an extension came from
///
/// Local extensions are scaffolded from the starter template and built in
/// place; Market extensions are downloaded from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionOrigin {
    Local,
    Market,
}

/// Marker set an archive must satisfy when staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// A distributable package: requires `build/` and `.output/public/`
    Runtime,
    /// The scaffolding starter template: requires `package.json`
    Template,
}

/// Promotion mode for the directory swapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoteMode {
    /// Replace the live directory verbatim
    Install,
    /// Replace the live directory but carry preserved directories over
    Upgrade,
}

impl std::fmt::Display for PromoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromoteMode::Install => write!(f, "install"),
            PromoteMode::Upgrade => write!(f, "upgrade"),
        }
    }
}

/// Persistent record of an installed extension
///
/// Created on successful install/scaffold, updated in place on upgrade,
/// deleted on successful uninstall. No partial record may exist once an
/// operation has returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRecord {
    /// Globally unique identifier, stable across versions
    pub identifier: String,

    /// Installed version (semver)
    pub version: String,

    pub status: ExtensionStatus,

    pub origin: ExtensionOrigin,

    /// Extension type/category (descriptive, opaque to lifecycle logic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub supported_terminals: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl ExtensionRecord {
    /// Create a record with the given identity and empty descriptive fields
    pub fn new(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
            status: ExtensionStatus::Enabled,
            origin: ExtensionOrigin::Market,
            kind: None,
            supported_terminals: Vec::new(),
            author: None,
            homepage: None,
            documentation: None,
        }
    }

    /// Fill descriptive fields from registry detail
    pub fn apply_detail(&mut self, detail: &RegistryDetail) {
        self.kind = detail.kind.clone();
        self.supported_terminals = detail.supported_terminals.clone();
        self.author = detail.author.clone();
        self.homepage = detail.homepage.clone();
        self.documentation = detail.documentation.clone();
    }
}

/// One published version as reported by the registry (newest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryVersion {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Descriptive metadata for an extension as reported by the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub supported_terminals: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Caller-supplied fields for scaffolding a new local extension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldRequest {
    pub identifier: String,

    /// Human-readable name written into the descriptor files
    pub name: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// First-install marker written to `extensions/<id>/data/.installed`
///
/// Read by the external seed runner to detect the first time an identifier
/// has ever been installed, across host restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallMarker {
    pub installed_at: DateTime<Utc>,
    pub version: String,
    pub identifier: String,
}

/// One entry in the enabled-extensions config document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Descriptive manifest snapshot for the host to show at boot
    pub manifest: serde_json::Value,

    pub is_local: bool,

    pub enabled: bool,

    pub installed_at: DateTime<Utc>,
}

/// Outcome of a host process reload request
#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub success: bool,
    pub message: String,
}
