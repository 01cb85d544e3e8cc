//! unitconv server library: configuration, wiring and the HTTP router.

use std::env;
use std::future::Future;
use std::io;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use unitconv::ConversionService;
use unitconv_core::ConvertError;
use unitconv_registry::{FileStore, Registry};

pub mod config;
pub mod error;
pub mod routes;

use config::{Config, StorageBackend, StorageConfig};

pub use routes::create_router;

/// Filter used when `UNITCONV_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,axum=info";

/// Initialize global tracing subscribers using environment configuration.
///
/// `UNITCONV_LOG` takes an `EnvFilter` directive; `UNITCONV_LOG_STYLE=always`
/// enables ANSI colours.
pub fn init_tracing() {
    let env_filter = env::var("UNITCONV_LOG")
        .ok()
        .and_then(|value| tracing_subscriber::EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let mut fmt_builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stdout)
        .with_ansi(false)
        .with_target(false);

    if let Ok(style) = env::var("UNITCONV_LOG_STYLE") {
        if style.eq_ignore_ascii_case("always") {
            fmt_builder = fmt_builder.with_ansi(true);
        }
    }

    // A subscriber may already be installed (e.g. by a test harness)
    let _ = fmt_builder.try_init();
}

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ConversionService,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            service: ConversionService::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        self.service.registry()
    }
}

/// Open the configured store and optionally install the default unit tables
pub async fn build_registry(storage: &StorageConfig, seed_defaults: bool) -> Result<Registry, ConvertError> {
    let registry = match (storage.backend, &storage.path) {
        (StorageBackend::File, Some(path)) => Registry::new(FileStore::open(path).await?),
        (StorageBackend::File, None) => {
            return Err(ConvertError::storage("file backend requires storage.path"))
        }
        (StorageBackend::Memory, _) => Registry::in_memory(),
    };

    if seed_defaults {
        let installed = registry.seed_defaults().await?;
        if !installed.is_empty() {
            info!(categories = ?installed, "Seeded default unit tables");
        }
    }

    Ok(registry)
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn serve(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind_address))?;

    let registry = build_registry(&config.storage, config.seed_defaults)
        .await
        .context("Failed to open registry")?;
    let app = create_router(AppState::new(registry));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, backend = ?config.storage.backend, "unitconv server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("unitconv server shutdown complete");
    Ok(())
}
