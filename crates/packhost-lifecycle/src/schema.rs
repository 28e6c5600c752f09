//! Per-extension database schema boundary
//!
//! Each extension owns a private database schema named after its identifier.
//! Schema creation happens in the host's migration tooling; the lifecycle
//! subsystem only drops the schema during uninstall, and treats any failure
//! there as non-fatal.

use async_trait::async_trait;
use packhost_core::Result;
use tracing::debug;

/// Schema existence check and drop, consumed during uninstall
#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Whether a schema with this name exists
    async fn schema_exists(&self, name: &str) -> Result<bool>;

    /// Drop the schema and everything in it
    async fn drop_schema(&self, name: &str) -> Result<()>;
}

/// Schema manager for hosts that run without per-extension schemas
///
/// Reports every schema as absent and drops nothing.
pub struct NoopSchemaManager;

#[async_trait]
impl SchemaManager for NoopSchemaManager {
    async fn schema_exists(&self, name: &str) -> Result<bool> {
        debug!("Schema management disabled, treating '{}' as absent", name);
        Ok(false)
    }

    async fn drop_schema(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}
