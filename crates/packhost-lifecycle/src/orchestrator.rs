//! Lifecycle orchestration
//!
//! The top-level state machine over install/upgrade/uninstall/scaffold. Each
//! operation is all-or-nothing from the caller's point of view: install and
//! scaffold are create-only (an existing live directory is a hard error),
//! upgrade is the only mutate-in-place path, and uninstall deletes the
//! metadata record last so a crash mid-way leaves a harmless orphaned
//! directory rather than a dangling record.
//!
//! All operations on one identifier are serialized through a per-identifier
//! mutex held for the full duration of the call, so two concurrent installs
//! or upgrades cannot interleave their directory swaps.

use crate::assets::AssetPublisher;
use crate::cache::PackageCache;
use crate::config_file::{make_entry, EnabledConfig, DEFAULT_SECTION};
use crate::registry::RegistryClient;
use crate::reload::ReloadScheduler;
use crate::scaffold::patch_descriptors;
use crate::schema::SchemaManager;
use crate::stager::{has_markers, ArchiveStager};
use crate::store::MetadataStore;
use crate::subprocess;
use crate::swap::DirectorySwapper;
use chrono::Utc;
use packhost_core::paths::schema_name;
use packhost_core::types::{
    ExtensionOrigin, ExtensionRecord, InstallMarker, PackageKind, PromoteMode, ScaffoldRequest,
};
use packhost_core::{Error, HostPaths, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Tunables for one orchestrator instance
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Host filesystem layout
    pub paths: HostPaths,

    /// Command line for installing an extension's shared dependencies,
    /// run inside the live directory
    pub dependency_install: Vec<String>,

    /// Command line for building a scaffolded extension in place
    pub build: Vec<String>,

    /// Timeout applied to each subprocess invocation
    pub command_timeout: Duration,

    /// Fixed starter-template archive used by scaffold
    pub template_archive: PathBuf,

    /// Section of the enabled-extensions config new entries land in
    pub config_section: String,
}

impl OrchestratorConfig {
    /// Defaults for a host rooted at `paths`
    pub fn new(paths: HostPaths, template_archive: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            dependency_install: vec![
                "npm".to_string(),
                "install".to_string(),
                "--omit=dev".to_string(),
            ],
            build: vec!["npm".to_string(), "run".to_string(), "build".to_string()],
            command_timeout: Duration::from_secs(300),
            template_archive: template_archive.into(),
            config_section: DEFAULT_SECTION.to_string(),
        }
    }
}

/// Top-level extension lifecycle state machine
pub struct LifecycleOrchestrator {
    config: OrchestratorConfig,
    registry: Arc<dyn RegistryClient>,
    store: Arc<dyn MetadataStore>,
    schema: Arc<dyn SchemaManager>,
    enabled: Arc<EnabledConfig>,
    reload: Arc<ReloadScheduler>,
    cache: PackageCache,
    stager: ArchiveStager,
    swapper: DirectorySwapper,
    assets: AssetPublisher,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LifecycleOrchestrator {
    /// Wire an orchestrator from its collaborators
    pub fn new(
        config: OrchestratorConfig,
        registry: Arc<dyn RegistryClient>,
        store: Arc<dyn MetadataStore>,
        schema: Arc<dyn SchemaManager>,
        enabled: Arc<EnabledConfig>,
        reload: Arc<ReloadScheduler>,
    ) -> Self {
        let temp_dir = config.paths.temp_dir();
        let public_root = config.paths.public_extensions_dir();

        Self {
            cache: PackageCache::new(&temp_dir),
            stager: ArchiveStager::new(&temp_dir),
            swapper: DirectorySwapper::new(&temp_dir),
            assets: AssetPublisher::new(public_root),
            config,
            registry,
            store,
            schema,
            enabled,
            reload,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Install an extension from the registry
    ///
    /// Resolves the target version (latest when not given), fetches or
    /// reuses a cached archive, stages and promotes it, then persists the
    /// record, config entry, and web assets. The metadata record is written
    /// only after the live directory passed structural validation.
    pub async fn install(
        &self,
        identifier: &str,
        version: Option<&str>,
    ) -> Result<ExtensionRecord> {
        let _guard = self.lock_identifier(identifier).await;
        info!("Installing extension '{}'", identifier);

        let version = self.resolve_version(identifier, version).await?;
        let archive = self
            .fetch_archive(identifier, &version, PromoteMode::Install)
            .await?;

        let staged = self.stager.stage(&archive, PackageKind::Runtime).await?;
        let live_dir = self.config.paths.extension_dir(identifier);

        if live_dir.exists() {
            staged.cleanup().await?;
            return Err(Error::already_exists(identifier));
        }

        let promoted = self
            .swapper
            .promote(staged.root(), &live_dir, PromoteMode::Install)
            .await;
        staged.cleanup().await?;
        promoted?;

        if let Err(e) = self.validate_live_structure(identifier, &live_dir) {
            // A structurally invalid package never becomes installed
            let _ = tokio::fs::remove_dir_all(&live_dir).await;
            return Err(e);
        }

        let mut record = ExtensionRecord::new(identifier, &version);
        record.origin = ExtensionOrigin::Market;
        match self.registry.get_detail(identifier).await {
            Ok(detail) => record.apply_detail(&detail),
            Err(e) => warn!("Could not fetch registry detail for '{}': {}", identifier, e),
        }

        if let Err(e) = self.persist_install(identifier, &record, false).await {
            // Roll back to absent: no partial record may outlive a failure
            // before the extension is fully registered.
            let _ = tokio::fs::remove_dir_all(&live_dir).await;
            return Err(e);
        }

        self.assets
            .publish(identifier, &self.config.paths.package_public_dir(identifier))
            .await?;
        self.install_dependencies(identifier, &live_dir).await?;
        self.reload.arm().await;

        info!("Installed extension '{}' version {}", identifier, version);
        Ok(record)
    }

    /// Upgrade an installed extension to the latest registry version
    ///
    /// Preserves the conventional data/storage/dependency directories unless
    /// the new package ships its own replacements.
    pub async fn upgrade(&self, identifier: &str) -> Result<ExtensionRecord> {
        let _guard = self.lock_identifier(identifier).await;
        info!("Upgrading extension '{}'", identifier);

        let mut record = self
            .store
            .find(identifier)
            .await?
            .ok_or_else(|| Error::not_found(identifier))?;

        let version = self.resolve_version(identifier, None).await?;
        let archive = self
            .fetch_archive(identifier, &version, PromoteMode::Upgrade)
            .await?;

        let staged = self.stager.stage(&archive, PackageKind::Runtime).await?;
        let live_dir = self.config.paths.extension_dir(identifier);

        let promoted = self
            .swapper
            .promote(staged.root(), &live_dir, PromoteMode::Upgrade)
            .await;
        staged.cleanup().await?;
        promoted?;

        self.validate_live_structure(identifier, &live_dir)?;

        let previous = std::mem::replace(&mut record.version, version.clone());
        match self.registry.get_detail(identifier).await {
            Ok(detail) => record.apply_detail(&detail),
            Err(e) => warn!("Could not fetch registry detail for '{}': {}", identifier, e),
        }

        self.store.update(record.clone()).await?;
        self.enabled
            .add_entry(
                identifier,
                make_entry(
                    serde_json::to_value(&record)?,
                    record.origin == ExtensionOrigin::Local,
                ),
                &self.config.config_section,
            )
            .await?;

        self.assets
            .publish(identifier, &self.config.paths.package_public_dir(identifier))
            .await?;
        self.install_dependencies(identifier, &live_dir).await?;
        self.reload.arm().await;

        info!(
            "Upgraded extension '{}' {} -> {}",
            identifier, previous, version
        );
        Ok(record)
    }

    /// Uninstall an extension
    ///
    /// Physical cleanup happens first and tolerates absence everywhere, so a
    /// partially failed uninstall can simply be re-run. The metadata record
    /// is deleted last.
    pub async fn uninstall(&self, identifier: &str) -> Result<()> {
        let _guard = self.lock_identifier(identifier).await;
        info!("Uninstalling extension '{}'", identifier);

        let record = self
            .store
            .find(identifier)
            .await?
            .ok_or_else(|| Error::not_found(identifier))?;

        let live_dir = self.config.paths.extension_dir(identifier);
        tokio::task::spawn_blocking(move || {
            packhost_core::fsutil::remove_dir_if_exists(&live_dir)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        if let Err(e) = self.assets.retract(identifier).await {
            warn!("Failed to retract assets for '{}': {}", identifier, e);
        }

        self.enabled.remove_entry(identifier).await?;

        let schema = schema_name(identifier);
        match self.schema.schema_exists(&schema).await {
            Ok(true) => {
                if let Err(e) = self.schema.drop_schema(&schema).await {
                    warn!("Failed to drop schema '{}': {}", schema, e);
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Could not check schema '{}': {}", schema, e),
        }

        self.store.delete(identifier).await?;

        if let Err(e) = self
            .registry
            .notify_uninstall(identifier, &record.version)
            .await
        {
            warn!("Failed to notify registry of uninstall for '{}': {}", identifier, e);
        }

        self.reload.arm().await;

        info!("Uninstalled extension '{}'", identifier);
        Ok(())
    }

    /// Scaffold a new local extension from the starter template
    ///
    /// Create-only: both an existing record and an existing live directory
    /// are hard errors; scaffolding never overwrites.
    pub async fn scaffold(&self, request: &ScaffoldRequest) -> Result<ExtensionRecord> {
        let identifier = request.identifier.as_str();
        let _guard = self.lock_identifier(identifier).await;
        info!("Scaffolding extension '{}'", identifier);

        semver::Version::parse(&request.version)
            .map_err(|_| Error::invalid_version(&request.version))?;

        if self.store.find(identifier).await?.is_some() {
            return Err(Error::already_exists(identifier));
        }

        let live_dir = self.config.paths.extension_dir(identifier);
        if live_dir.exists() {
            return Err(Error::already_exists(identifier));
        }

        let staged = self
            .stager
            .stage(&self.config.template_archive, PackageKind::Template)
            .await?;
        let promoted = self
            .swapper
            .promote(staged.root(), &live_dir, PromoteMode::Install)
            .await;
        staged.cleanup().await?;
        promoted?;

        let mut record = ExtensionRecord::new(identifier, &request.version);
        record.origin = ExtensionOrigin::Local;
        record.author = request.author.clone();

        let registered = async {
            patch_descriptors(&live_dir, request).await?;
            self.persist_install(identifier, &record, true).await
        }
        .await;

        if let Err(e) = registered {
            let _ = tokio::fs::remove_dir_all(&live_dir).await;
            return Err(e);
        }

        self.install_dependencies(identifier, &live_dir).await?;
        self.build_extension(identifier, &live_dir).await?;
        self.assets
            .publish(identifier, &self.config.paths.package_public_dir(identifier))
            .await?;
        self.reload.arm().await;

        info!(
            "Scaffolded extension '{}' version {}",
            identifier, request.version
        );
        Ok(record)
    }

    /// List all metadata records
    pub async fn list(&self) -> Result<Vec<ExtensionRecord>> {
        self.store.list().await
    }

    /// Serialize lifecycle operations per identifier
    async fn lock_identifier(&self, identifier: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(identifier.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Resolve the target version: explicit when given, registry latest otherwise
    async fn resolve_version(&self, identifier: &str, requested: Option<&str>) -> Result<String> {
        let version = match requested {
            Some(v) => v.to_string(),
            None => {
                let versions = self.registry.get_versions(identifier).await?;
                versions
                    .first()
                    .map(|v| v.version.clone())
                    .ok_or_else(|| Error::NoVersions {
                        identifier: identifier.to_string(),
                    })?
            }
        };

        semver::Version::parse(&version).map_err(|_| Error::invalid_version(&version))?;
        Ok(version)
    }

    /// Return a cached archive or download a fresh one into the cache
    async fn fetch_archive(
        &self,
        identifier: &str,
        version: &str,
        mode: PromoteMode,
    ) -> Result<PathBuf> {
        if let Some(cached) = self.cache.resolve(identifier, version)? {
            info!(
                "Using cached archive for '{}' {}: {:?}",
                identifier, version, cached
            );
            return Ok(cached);
        }

        let url = self
            .registry
            .get_download_url(identifier, version, mode)
            .await?;
        let basename = PackageCache::basename(identifier, version);

        self.registry
            .download(&url, self.cache.temp_dir(), &basename)
            .await
            .map_err(|e| Error::download_failed(identifier, e.to_string()))
    }

    /// Re-check the runtime marker layout after promotion
    fn validate_live_structure(&self, identifier: &str, live_dir: &Path) -> Result<()> {
        if has_markers(live_dir, PackageKind::Runtime) {
            Ok(())
        } else {
            Err(Error::invalid_structure(
                live_dir.display().to_string(),
                format!("required package layout for '{}'", identifier),
            ))
        }
    }

    /// Write the first-install marker, metadata record, and config entry
    async fn persist_install(
        &self,
        identifier: &str,
        record: &ExtensionRecord,
        is_local: bool,
    ) -> Result<()> {
        self.write_install_marker(identifier, &record.version).await?;
        self.store.create(record.clone()).await?;
        self.enabled
            .add_entry(
                identifier,
                make_entry(serde_json::to_value(record)?, is_local),
                &self.config.config_section,
            )
            .await?;
        Ok(())
    }

    /// Record `{installed_at, version, identifier}` for the seed runner
    async fn write_install_marker(&self, identifier: &str, version: &str) -> Result<()> {
        let marker = InstallMarker {
            installed_at: Utc::now(),
            version: version.to_string(),
            identifier: identifier.to_string(),
        };

        let path = self.config.paths.install_marker(identifier);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, serde_json::to_string_pretty(&marker)?).await?;
        Ok(())
    }

    async fn install_dependencies(&self, identifier: &str, live_dir: &Path) -> Result<()> {
        info!("Installing shared dependencies for '{}'", identifier);
        subprocess::run_in_dir(
            &self.config.dependency_install,
            live_dir,
            self.config.command_timeout,
        )
        .await
        .map_err(|e| Error::dependency_install_failed(identifier, e.to_string()))
    }

    async fn build_extension(&self, identifier: &str, live_dir: &Path) -> Result<()> {
        info!("Building extension '{}' in place", identifier);
        subprocess::run_in_dir(&self.config.build, live_dir, self.config.command_timeout)
            .await
            .map_err(|e| Error::build_failed(identifier, e.to_string()))
    }
}
