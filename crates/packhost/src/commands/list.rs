//! List command

use anyhow::Result;
use packhost_core::types::{ExtensionOrigin, ExtensionStatus};
use tabled::{Table, Tabled};

use crate::cli::{GlobalArgs, ListArgs};
use crate::output;

#[derive(Tabled)]
struct ExtensionRow {
    #[tabled(rename = "IDENTIFIER")]
    identifier: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "ORIGIN")]
    origin: &'static str,
    #[tabled(rename = "AUTHOR")]
    author: String,
}

pub async fn run(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let (orchestrator, _reload) = super::build_orchestrator(global, None)?;

    let records = orchestrator.list().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        output::info("No extensions installed");
        return Ok(());
    }

    let rows: Vec<ExtensionRow> = records
        .into_iter()
        .map(|r| ExtensionRow {
            identifier: r.identifier,
            version: r.version,
            status: match r.status {
                ExtensionStatus::Enabled => "enabled",
                ExtensionStatus::Disabled => "disabled",
            },
            origin: match r.origin {
                ExtensionOrigin::Local => "local",
                ExtensionOrigin::Market => "market",
            },
            author: r.author.unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
