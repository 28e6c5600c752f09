//! Packhost CLI - Extension package lifecycle manager
//!
//! This is the main entry point for the packhost command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Install(args) => commands::install::run(args, &cli.global).await,
        Commands::Upgrade(args) => commands::upgrade::run(args, &cli.global).await,
        Commands::Remove(args) => commands::remove::run(args, &cli.global).await,
        Commands::Scaffold(args) => commands::scaffold::run(args, &cli.global).await,
        Commands::List(args) => commands::list::run(args, &cli.global).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
