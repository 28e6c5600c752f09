//! Descriptor patching for scaffolded extensions
//!
//! A freshly extracted starter template carries placeholder values in its
//! two descriptor files (`manifest.json` and `package.json`). Both are
//! patched with the caller-supplied identity via a JSON round-trip that
//! preserves every field the patch does not touch.

use packhost_core::types::ScaffoldRequest;
use packhost_core::{Error, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Descriptor files patched inside a newly scaffolded extension directory
pub const DESCRIPTOR_FILES: &[&str] = &["manifest.json", "package.json"];

/// Patch both descriptor files in a scaffolded live directory
pub async fn patch_descriptors(live_dir: &Path, request: &ScaffoldRequest) -> Result<()> {
    for file in DESCRIPTOR_FILES {
        let path = live_dir.join(file);
        if !path.is_file() {
            return Err(Error::invalid_structure(
                live_dir.display().to_string(),
                *file,
            ));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let mut doc: Value = serde_json::from_str(&content)?;
        apply_patch(&mut doc, request);

        tokio::fs::write(&path, serde_json::to_string_pretty(&doc)?).await?;
        debug!("Patched descriptor {:?}", path);
    }

    Ok(())
}

fn apply_patch(doc: &mut Value, request: &ScaffoldRequest) {
    if let Value::Object(map) = doc {
        map.insert("name".to_string(), Value::String(request.name.clone()));
        map.insert(
            "version".to_string(),
            Value::String(request.version.clone()),
        );
        if let Some(description) = &request.description {
            map.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        if let Some(author) = &request.author {
            map.insert("author".to_string(), Value::String(author.clone()));
        }
    }
}
