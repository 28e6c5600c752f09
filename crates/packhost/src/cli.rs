//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Packhost - Extension package lifecycle manager
#[derive(Parser, Debug)]
#[command(name = "packhost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every lifecycle command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Host root directory (defaults to ~/.packhost)
    #[arg(long, global = true, env = "PACKHOST_ROOT")]
    pub root: Option<PathBuf>,

    /// Package registry base URL
    #[arg(
        long,
        global = true,
        env = "PACKHOST_REGISTRY",
        default_value = "https://market.packhost.dev/api"
    )]
    pub registry: String,

    /// Process manager application name to reload (defaults to all)
    #[arg(long, global = true, env = "PACKHOST_APP")]
    pub app: Option<String>,

    /// Process manager control binary
    #[arg(long, global = true, default_value = "pm2")]
    pub process_binary: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install an extension from the registry
    Install(InstallArgs),

    /// Upgrade an installed extension to the latest version
    Upgrade(UpgradeArgs),

    /// Remove an installed extension
    Remove(RemoveArgs),

    /// Scaffold a new local extension from the starter template
    Scaffold(ScaffoldArgs),

    /// List installed extensions
    List(ListArgs),
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct InstallArgs {
    /// Extension identifier
    pub identifier: String,

    /// Specific version to install (defaults to latest)
    #[arg(short = 'V', long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Extension identifier
    pub identifier: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Extension identifier
    pub identifier: String,
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct ScaffoldArgs {
    /// Identifier for the new extension
    pub identifier: String,

    /// Human-readable name (defaults to the identifier)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Initial version
    #[arg(short = 'V', long, default_value = "0.1.0")]
    pub version: String,

    /// Short description written into the descriptors
    #[arg(short, long)]
    pub description: Option<String>,

    /// Author written into the descriptors
    #[arg(short, long)]
    pub author: Option<String>,

    /// Starter template archive (defaults to <root>/templates/starter.tar.gz)
    #[arg(long)]
    pub template: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
