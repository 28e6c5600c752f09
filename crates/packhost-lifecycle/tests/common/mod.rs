//! Shared fixtures for lifecycle integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use packhost_core::types::{
    PromoteMode, RegistryDetail, RegistryVersion, ReloadOutcome,
};
use packhost_core::{Error, HostPaths, Result};
use packhost_lifecycle::{
    EnabledConfig, JsonMetadataStore, LifecycleOrchestrator, NoopSchemaManager,
    OrchestratorConfig, ProcessManager, RegistryClient, ReloadScheduler,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Build a gzip tarball from a prepared directory tree
pub fn build_archive(content_dir: &Path, dest: &Path) {
    let file = fs::File::create(dest).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", content_dir).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// Write a distributable-package archive with the required marker layout
/// plus any extra files (relative path, content)
pub fn write_runtime_archive(dest: &Path, files: &[(&str, &str)]) {
    let staging = TempDir::new().unwrap();
    fs::create_dir_all(staging.path().join("build")).unwrap();
    fs::create_dir_all(staging.path().join(".output/public")).unwrap();

    for (rel, content) in files {
        let path = staging.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    build_archive(staging.path(), dest);
}

/// Write a starter-template archive with placeholder descriptors
pub fn write_template_archive(dest: &Path) {
    let staging = TempDir::new().unwrap();
    fs::write(
        staging.path().join("package.json"),
        r#"{"name": "starter", "version": "0.0.0", "scripts": {"build": "true"}}"#,
    )
    .unwrap();
    fs::write(
        staging.path().join("manifest.json"),
        r#"{"name": "starter", "version": "0.0.0", "entry": "build/server.mjs"}"#,
    )
    .unwrap();

    build_archive(staging.path(), dest);
}

/// In-memory registry serving prebuilt archives from the local filesystem
#[derive(Default)]
pub struct MockRegistry {
    /// identifier -> (version, archive path), newest first
    published: Mutex<HashMap<String, Vec<(String, PathBuf)>>>,
    pub downloads: AtomicUsize,
    pub uninstall_notices: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a version; later publishes become "latest"
    pub fn publish(&self, identifier: &str, version: &str, archive: PathBuf) {
        self.published
            .lock()
            .unwrap()
            .entry(identifier.to_string())
            .or_default()
            .insert(0, (version.to_string(), archive));
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn get_versions(&self, identifier: &str) -> Result<Vec<RegistryVersion>> {
        let published = self.published.lock().unwrap();
        Ok(published
            .get(identifier)
            .map(|versions| {
                versions
                    .iter()
                    .map(|(v, _)| RegistryVersion {
                        version: v.clone(),
                        published_at: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_download_url(
        &self,
        identifier: &str,
        version: &str,
        _mode: PromoteMode,
    ) -> Result<String> {
        Ok(format!("mock://{}/{}", identifier, version))
    }

    async fn get_detail(&self, _identifier: &str) -> Result<RegistryDetail> {
        Ok(RegistryDetail {
            author: Some("mock".to_string()),
            ..Default::default()
        })
    }

    async fn download(&self, url: &str, dest_dir: &Path, basename: &str) -> Result<PathBuf> {
        let rest = url
            .strip_prefix("mock://")
            .ok_or_else(|| Error::registry(format!("unexpected url: {}", url)))?;
        let (identifier, version) = rest
            .split_once('/')
            .ok_or_else(|| Error::registry(format!("unexpected url: {}", url)))?;

        let source = {
            let published = self.published.lock().unwrap();
            published
                .get(identifier)
                .and_then(|versions| {
                    versions
                        .iter()
                        .find(|(v, _)| v == version)
                        .map(|(_, path)| path.clone())
                })
                .ok_or_else(|| Error::registry(format!("no archive for {}", url)))?
        };

        self.downloads.fetch_add(1, Ordering::SeqCst);

        fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(format!("{}.tar.gz", basename));
        fs::copy(&source, &dest)?;
        Ok(dest)
    }

    async fn notify_uninstall(&self, _identifier: &str, _version: &str) -> Result<()> {
        self.uninstall_notices.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Process manager that counts reload requests and always succeeds
#[derive(Default)]
pub struct CountingProcessManager {
    pub reloads: AtomicUsize,
}

impl CountingProcessManager {
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessManager for CountingProcessManager {
    async fn reload(&self, _app_name: Option<&str>) -> ReloadOutcome {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        ReloadOutcome {
            success: true,
            message: "reloaded".to_string(),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// A fully wired orchestrator over a throwaway host root
pub struct TestHost {
    pub temp: TempDir,
    pub paths: HostPaths,
    pub registry: Arc<MockRegistry>,
    pub process: Arc<CountingProcessManager>,
    pub reload: Arc<ReloadScheduler>,
    pub enabled: Arc<EnabledConfig>,
    pub orchestrator: LifecycleOrchestrator,
}

impl TestHost {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("host");
        let paths = HostPaths::new(&root);

        let template = temp.path().join("starter.tar.gz");
        write_template_archive(&template);

        let registry = Arc::new(MockRegistry::new());
        let process = Arc::new(CountingProcessManager::default());
        let reload = Arc::new(ReloadScheduler::with_window(
            process.clone(),
            None,
            Duration::from_millis(50),
        ));
        let store =
            Arc::new(JsonMetadataStore::open(root.join("records.json")).unwrap());
        let enabled = Arc::new(EnabledConfig::new(paths.config_file()));

        let mut config = OrchestratorConfig::new(paths.clone(), &template);
        // Subprocess steps are exercised with a no-op command; the real npm
        // invocations are covered by the subprocess module's own tests.
        config.dependency_install = vec!["true".to_string()];
        config.build = vec!["true".to_string()];

        let orchestrator = LifecycleOrchestrator::new(
            config,
            registry.clone(),
            store,
            Arc::new(NoopSchemaManager),
            enabled.clone(),
            reload.clone(),
        );

        Self {
            temp,
            paths,
            registry,
            process,
            reload,
            enabled,
            orchestrator,
        }
    }

    /// Publish a minimal valid package archive for (identifier, version)
    ///
    /// `extra_files` land inside the package root on top of the markers.
    pub fn publish_package(&self, identifier: &str, version: &str, extra_files: &[(&str, &str)]) {
        let archive = self
            .temp
            .path()
            .join(format!("{}-{}.tar.gz", identifier, version));
        write_runtime_archive(&archive, extra_files);
        self.registry.publish(identifier, version, archive);
    }
}
