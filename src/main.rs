//! Main entry point for the pod registry.
//!
//! `serve` runs the Axum web server; `seed` and `list` work on the snapshot
//! file directly.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pod_registry::config::{Cli, Command, Config, open_registry};
use pod_registry::pod::seed;
use pod_registry::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_new(&cli.log_filter)
        .with_context(|| format!("invalid log filter '{}'", cli.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve(serve_args) => {
            let config = Config::new(&cli.storage, serve_args);
            info!("Starting pod registry server...");
            let registry = config
                .open_registry()
                .context("failed to open the registry")?;
            server::serve(&config, registry)
                .await
                .context("server failed")?;
        }
        Command::Seed { solo } => {
            let registry = open_registry(Some(cli.storage.data_file.as_path()), cli.storage.max_pods)
                .context("failed to open the registry")?;
            let inserted = seed::seed(&registry, solo).context("failed to seed the registry")?;
            info!("Inserted {} demo students", inserted.len());
        }
        Command::List => {
            let registry = open_registry(Some(cli.storage.data_file.as_path()), cli.storage.max_pods)
                .context("failed to open the registry")?;
            registry
                .write_json_lines(std::io::stdout().lock())
                .context("failed to write the listing")?;
        }
    }

    Ok(())
}
