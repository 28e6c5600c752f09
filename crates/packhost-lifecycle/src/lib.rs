//! Extension package lifecycle management for Packhost
//!
//! This crate handles:
//! - Archive caching, staging, and validation
//! - Promotion of staged packages into the live extension directory
//! - Selective preservation of user data across upgrades
//! - Publishing extension web assets into the shared public root
//! - Debounced host-process reloads
//! - The install/upgrade/uninstall/scaffold state machine

pub mod assets;
pub mod cache;
pub mod config_file;
pub mod orchestrator;
pub mod process;
pub mod registry;
pub mod reload;
pub mod scaffold;
pub mod schema;
pub mod stager;
pub mod store;
pub mod subprocess;
pub mod swap;

pub use assets::AssetPublisher;
pub use cache::PackageCache;
pub use config_file::EnabledConfig;
pub use orchestrator::{LifecycleOrchestrator, OrchestratorConfig};
pub use process::{CommandProcessManager, ProcessManager};
pub use registry::{HttpRegistryClient, RegistryClient};
pub use reload::ReloadScheduler;
pub use schema::{NoopSchemaManager, SchemaManager};
pub use stager::{ArchiveStager, StagedPackage};
pub use store::{JsonMetadataStore, MetadataStore};
pub use swap::DirectorySwapper;
