//! qmd-remote CLI
//!
//! Configure and exercise the remote inference endpoints used by qmd search.

use anyhow::Result;
use clap::Parser;
use qmd_remote_core::{ConfigStore, QmdError};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    // Config location follows QMD_CONFIG_DIR when set
    let store = ConfigStore::open_default();

    let result = match cli.command {
        Commands::Remote(args) => commands::remote::run(args, &store, cli.format).await,
        Commands::Dir(args) => commands::dir::run(args, &store, cli.format).await,
        Commands::Health => commands::health::run(&store, cli.format).await,
        Commands::Expand(args) => commands::expand::run(args, &store, cli.format).await,
        Commands::Embed(args) => commands::embed::run(args, &store, cli.format).await,
        Commands::Rerank(args) => commands::rerank::run(args, &store, cli.format).await,
    };

    match result {
        Err(e) => match e.downcast_ref::<QmdError>() {
            Some(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(err.exit_code());
            }
            None => Err(e),
        },
        ok => ok,
    }
}
