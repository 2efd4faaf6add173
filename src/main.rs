// ABOUTME: Entry point for the ascend CLI application.
// ABOUTME: Loads configuration, connects to the engine, then serves or deploys once.

mod cli;

use ascend::config::Config;
use ascend::deploy::{DeployRequest, Orchestrator};
use ascend::error::{Error, Result};
use ascend::{runtime, server};
use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { listen, logs_dir } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(logs_dir) = logs_dir {
                config.logs_dir = logs_dir;
            }
            serve(config).await
        }
        Commands::Deploy { request } => deploy_once(config, &request).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover_or_default(&env::current_dir()?),
    }
}

async fn serve(config: Config) -> Result<()> {
    let runtime = runtime::connect(&config.runtime_config()).await?;
    let listen = config.listen.clone();
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(runtime), config));

    server::serve(&listen, orchestrator, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

/// Deploy from a request file, print the DockerResponse, fail on an error response.
async fn deploy_once(config: Config, request_path: &Path) -> Result<()> {
    let body = std::fs::read_to_string(request_path)?;
    if body.trim().is_empty() {
        return Err(Error::InvalidRequest(format!(
            "{} is empty",
            request_path.display()
        )));
    }
    let request: DeployRequest = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidRequest(format!("{}: {}", request_path.display(), e)))?;

    let runtime = runtime::connect(&config.runtime_config()).await?;
    let orchestrator = Orchestrator::new(Arc::new(runtime), config);
    let response = orchestrator.run(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    match response.error() {
        Some(message) => Err(Error::Deploy(message.to_string())),
        None => Ok(()),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for ctrl-c, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
