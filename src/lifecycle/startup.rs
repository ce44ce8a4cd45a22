//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Start the config watcher when requested
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, GatewayConfig};
use crate::config::loader::apply_env_overrides;
use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::ConfigError;
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{logging, metrics};

/// How the process was launched.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Config file; defaults plus environment overrides when absent.
    pub config_path: Option<PathBuf>,
    /// Reload the config file when it changes.
    pub watch: bool,
}

/// Resolve the startup configuration.
pub fn resolve_config(options: &StartupOptions) -> Result<GatewayConfig, ConfigError> {
    match &options.config_path {
        Some(path) => load_config(path),
        None => {
            let mut config = GatewayConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Run the gateway until a shutdown signal arrives.
pub async fn run(options: StartupOptions) -> Result<(), GatewayError> {
    let config = resolve_config(&options)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        main_domain = ?config.routing.main_domain,
        tenants = ?config.routing.allowed_tenants,
        locales = ?config.routing.supported_locales,
        default_locale = %config.routing.default_locale,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Held for the lifetime of the server; dropping it stops watching.
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let _watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    if config_tx.send(config).is_err() {
                        break;
                    }
                }
            });
            Some(handle)
        }
        _ => None,
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, config_rx, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
