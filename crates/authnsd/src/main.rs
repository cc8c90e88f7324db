// # authnsd - Authoritative Name Registry Daemon
//
// Thin integration layer over authns-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging
// 3. Opening the record store and binding the UDP endpoint
// 4. Serving until SIGINT/SIGTERM
//
// ## Configuration
//
// - `AUTHNS_LISTEN_ADDR`: UDP address to bind (default 0.0.0.0:53533)
// - `AUTHNS_STORE_TYPE`: Record store type (file, memory; default file)
// - `AUTHNS_STORE_PATH`: Snapshot path for the file store (default /tmp/dns_records.json)
// - `AUTHNS_MAX_DATAGRAM_SIZE`: Largest datagram served (default 1024)
// - `AUTHNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export AUTHNS_LISTEN_ADDR=0.0.0.0:53533
// export AUTHNS_STORE_PATH=/var/lib/authns/dns_records.json
//
// authnsd
// ```

use anyhow::{Context, Result};
use authns_core::config::DEFAULT_SNAPSHOT_PATH;
use authns_core::{AuthServer, ServerConfig, ServerEvent, StoreConfig};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AuthnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure (including bind failure)
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AuthnsExitCode> for ExitCode {
    fn from(code: AuthnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    listen_addr: SocketAddr,
    store_type: String,
    store_path: String,
    max_datagram_size: Option<usize>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let listen_addr = match env::var("AUTHNS_LISTEN_ADDR") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("AUTHNS_LISTEN_ADDR '{}' is not a socket address", addr))?,
            Err(_) => ServerConfig::default().listen,
        };

        let max_datagram_size = match env::var("AUTHNS_MAX_DATAGRAM_SIZE") {
            Ok(size) => Some(size.parse().with_context(|| {
                format!("AUTHNS_MAX_DATAGRAM_SIZE '{}' is not a number", size)
            })?),
            Err(_) => None,
        };

        Ok(Self {
            listen_addr,
            store_type: env::var("AUTHNS_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            store_path: env::var("AUTHNS_STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string()),
            max_datagram_size,
            log_level: env::var("AUTHNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration and build the server configuration
    fn into_server_config(self) -> Result<ServerConfig> {
        let store = match self.store_type.as_str() {
            "file" => StoreConfig::File {
                path: self.store_path,
            },
            "memory" => StoreConfig::Memory,
            other => anyhow::bail!(
                "AUTHNS_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                other
            ),
        };

        let mut config = ServerConfig::default()
            .with_listen(self.listen_addr)
            .with_store(store);
        if let Some(size) = self.max_datagram_size {
            config = config.with_max_datagram_size(size);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "AUTHNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AuthnsExitCode::ConfigError.into();
        }
    };

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return AuthnsExitCode::ConfigError.into();
        }
    };

    let server_config = match config.into_server_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return AuthnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AuthnsExitCode::ConfigError.into();
    }

    info!("Starting authnsd daemon");
    info!(
        "Store type: {}, listen address: {}",
        server_config.store.type_name(),
        server_config.listen
    );

    // Single-threaded runtime: one datagram at a time
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AuthnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(server_config)).into()
}

/// Run the daemon until a shutdown signal
async fn run_daemon(config: ServerConfig) -> AuthnsExitCode {
    let (server, events) = match AuthServer::from_config(&config).await {
        Ok(bound) => bound,
        Err(e) => {
            error!("Server failed to start: {}", e);
            return AuthnsExitCode::ConfigError;
        }
    };
    tokio::spawn(drain_events(events));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown handler error: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    match server.run_with_shutdown(Some(shutdown_rx)).await {
        Ok(()) => {
            info!("Shutting down daemon");
            AuthnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            AuthnsExitCode::RuntimeError
        }
    }
}

/// Log server events until the server drops its sink
///
/// Keeps the channel empty so emitting never hits a full buffer.
async fn drain_events(mut events: mpsc::Receiver<ServerEvent>) -> usize {
    let mut drained = 0;
    while let Some(event) = events.recv().await {
        debug!("Server event: {:?}", event);
        drained += 1;
    }
    drained
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
