//! unitconv server
//!
//! Endpoints:
//! - GET  /convert/{category}?from=<unit>&value=<number> - convert into every unit of the category
//! - POST /convert - register a category `{name, baseUnit}`
//! - GET  /convert - list categories with their units
//! - GET/POST /convert/{category}/units - list or add units
//! - GET  /health

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use unitconv_server::{
    config::{Config, DEFAULT_CONFIG_PATH},
    init_tracing, serve,
};

#[derive(Parser)]
#[command(name = "unitconv-server", about = "Unit conversion HTTP service", version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long = "config", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    info!(
        path = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting unitconv server"
    );
    let (config, _used_defaults) = Config::load_or_default(&cli.config).await;

    serve(config, shutdown_signal()).await
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Shutdown signal received (SIGINT)"),
        _ = terminate => info!("Shutdown signal received (SIGTERM)"),
    }
}
