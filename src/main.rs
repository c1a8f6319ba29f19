mod cli;
mod diff;
mod error;
mod handler;
mod informer;
mod kubernetes;
mod logger;
mod types;
mod utils;

use clap::Parser;
use std::io::IsTerminal;
use tracing::{debug, info};

use cli::Cli;
use handler::PodEventHandler;
use kubernetes::{PodWatcher, build_client, load_config};
use logger::{DefaultLogger, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(std::io::stdout)
        .init();

    let logger = DefaultLogger::new(cli.details);

    let config = load_config(cli.kubeconfig_path().as_deref())
        .await
        .inspect_err(|e| logger.error(e))?;
    let client = build_client(config).inspect_err(|e| logger.error(e))?;

    let watcher = PodWatcher::new(client, PodEventHandler::new(logger));
    let handle = watcher.watch(cli.namespace.as_deref(), &cli.selector, cli.resync_period());

    shutdown_signal().await?;
    info!("Shutting down");
    debug!("{} pods cached at shutdown", handle.store().state().len());
    handle.stop();
    handle.join().await;
    Ok(())
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}
