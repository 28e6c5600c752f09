//! Remove command

use anyhow::Result;

use crate::cli::{GlobalArgs, RemoveArgs};
use crate::output;

pub async fn run(args: RemoveArgs, global: &GlobalArgs) -> Result<()> {
    let (orchestrator, reload) = super::build_orchestrator(global, None)?;

    orchestrator.uninstall(&args.identifier).await?;

    output::success(&format!("Removed extension {}", args.identifier));

    output::info("Waiting for host reload");
    reload.flush().await;
    Ok(())
}
