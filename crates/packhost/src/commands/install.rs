//! Install command

use anyhow::Result;

use crate::cli::{GlobalArgs, InstallArgs};
use crate::output;

pub async fn run(args: InstallArgs, global: &GlobalArgs) -> Result<()> {
    let (orchestrator, reload) = super::build_orchestrator(global, None)?;

    let record = orchestrator
        .install(&args.identifier, args.version.as_deref())
        .await?;

    output::success(&format!(
        "Installed extension {} {}",
        record.identifier, record.version
    ));

    output::info("Waiting for host reload");
    reload.flush().await;
    Ok(())
}
