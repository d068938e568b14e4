mod config;
mod logging;
mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use requests::RequestsModule;
use requests::domain::ports::Ports;
use requests::infra::directory::HttpDirectoryClient;
use requests::infra::files::InMemoryFileStore;
use requests::infra::storage::{InMemoryHistoryRepository, InMemoryRequestsRepository};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

/// Dispatch Server - maintenance requests of a housing dispatch service
#[derive(Parser)]
#[command(name = "dispatch-server")]
#[command(about = "Dispatch Server - maintenance requests of a housing dispatch service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init(&config.logging);
    tracing::info!("Dispatch Server starting");

    let directory = Arc::new(HttpDirectoryClient::new(&config.requests.directory)?);
    let ports = Ports {
        requests: Arc::new(InMemoryRequestsRepository::new()),
        history: Arc::new(InMemoryHistoryRepository::new()),
        directory: directory.clone(),
        inventory: directory,
        files: Arc::new(InMemoryFileStore::new()),
    };
    let module = RequestsModule::new(&config.requests, ports);
    let app = module.router().layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Dispatch Server stopped");
    Ok(())
}
