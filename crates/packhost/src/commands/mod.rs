//! Command implementations

pub mod install;
pub mod list;
pub mod remove;
pub mod scaffold;
pub mod upgrade;

use anyhow::{Context, Result};
use packhost_core::HostPaths;
use packhost_lifecycle::{
    CommandProcessManager, EnabledConfig, HttpRegistryClient, JsonMetadataStore,
    LifecycleOrchestrator, NoopSchemaManager, OrchestratorConfig, ReloadScheduler,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Default starter-template archive location under the host root
fn default_template(paths: &HostPaths) -> PathBuf {
    paths.root().join("templates").join("starter.tar.gz")
}

/// Wire an orchestrator from the global CLI options
///
/// The reload scheduler is returned alongside so commands can flush a
/// pending debounced reload before the process exits.
pub fn build_orchestrator(
    global: &GlobalArgs,
    template: Option<&Path>,
) -> Result<(LifecycleOrchestrator, Arc<ReloadScheduler>)> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => packhost_core::get_home_dir()?.join(".packhost"),
    };
    let paths = HostPaths::new(root);

    let template_archive = template
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_template(&paths));

    let store = Arc::new(
        JsonMetadataStore::open(paths.root().join("records.json"))
            .context("Failed to open metadata store")?,
    );
    let enabled = Arc::new(EnabledConfig::new(paths.config_file()));
    let process = Arc::new(CommandProcessManager::new(&global.process_binary));
    let reload = Arc::new(ReloadScheduler::new(process, global.app.clone()));
    let registry = Arc::new(HttpRegistryClient::new(&global.registry));

    let config = OrchestratorConfig::new(paths, template_archive);
    let orchestrator = LifecycleOrchestrator::new(
        config,
        registry,
        store,
        Arc::new(NoopSchemaManager),
        enabled,
        Arc::clone(&reload),
    );

    Ok((orchestrator, reload))
}
