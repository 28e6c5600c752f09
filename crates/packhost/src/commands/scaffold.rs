//! Scaffold command

use anyhow::Result;
use packhost_core::types::ScaffoldRequest;

use crate::cli::{GlobalArgs, ScaffoldArgs};
use crate::output;

pub async fn run(args: ScaffoldArgs, global: &GlobalArgs) -> Result<()> {
    let (orchestrator, reload) = super::build_orchestrator(global, args.template.as_deref())?;

    let request = ScaffoldRequest {
        identifier: args.identifier.clone(),
        name: args.name.unwrap_or_else(|| args.identifier.clone()),
        version: args.version,
        description: args.description,
        author: args.author,
    };

    let record = orchestrator.scaffold(&request).await?;

    output::success(&format!(
        "Scaffolded extension {} {}",
        record.identifier, record.version
    ));
    output::kv("name", &request.name);

    output::info("Waiting for host reload");
    reload.flush().await;
    Ok(())
}
