//! Upgrade command

use anyhow::Result;

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::output;

pub async fn run(args: UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let (orchestrator, reload) = super::build_orchestrator(global, None)?;

    let record = orchestrator.upgrade(&args.identifier).await?;

    output::success(&format!(
        "Upgraded extension {} to {}",
        record.identifier, record.version
    ));

    output::info("Waiting for host reload");
    reload.flush().await;
    Ok(())
}
