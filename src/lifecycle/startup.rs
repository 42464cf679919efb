//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the declaration and publish the first table
//! - Start background tasks (watcher, metrics, admin)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::admin::setup_admin_router;
use crate::config::loader::DeclarationError;
use crate::config::reload::Reloader;
use crate::config::watcher::{RouteWatcher, WatchError};
use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error("invalid address {address:?}: {message}")]
    InvalidAddress { address: String, message: String },
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Handles to a started server.
pub struct Running {
    pub http_addr: SocketAddr,
    pub admin_addr: Option<SocketAddr>,
    pub reloader: Arc<Reloader>,
    tasks: Vec<JoinHandle<()>>,
}

impl Running {
    /// Wait for every task to finish after shutdown.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Task panicked during shutdown");
            }
        }
    }
}

/// Start all subsystems. Relative paths in `config` resolve against `base_dir`.
pub async fn start(
    config: ServerConfig,
    base_dir: &Path,
    shutdown: &Shutdown,
) -> Result<Running, StartupError> {
    let reloader = Arc::new(Reloader::bootstrap(
        Path::new(&config.declaration.path),
        base_dir,
    )?);
    let live = reloader.live().clone();

    if let Some(address) = &config.observability.metrics_address {
        let addr = parse_addr(address)?;
        metrics::init_metrics(addr);
    }

    let mut tasks = Vec::new();

    if config.watch.enabled {
        let watcher = RouteWatcher::new(
            Arc::clone(&reloader),
            Duration::from_millis(config.watch.debounce_ms),
        )?;
        tasks.push(watcher.spawn(shutdown.subscribe()));
    } else {
        tracing::info!("Hot reload disabled");
    }

    let admin_addr = match &config.admin.bind_address {
        Some(address) => {
            let listener = bind(address).await?;
            let addr = local_addr(&listener, address)?;
            let router = setup_admin_router(live.clone());
            let mut admin_shutdown = shutdown.subscribe();
            tasks.push(tokio::spawn(async move {
                tracing::info!(address = %addr, "Admin server starting");
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin server failed");
                }
            }));
            Some(addr)
        }
        None => None,
    };

    let listener = bind(&config.listener.bind_address).await?;
    let http_addr = local_addr(&listener, &config.listener.bind_address)?;
    let server = HttpServer::new(&config, live);
    let server_shutdown = shutdown.subscribe();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = server.run(listener, server_shutdown).await {
            tracing::error!(error = %e, "HTTP server failed");
        }
    }));

    tracing::info!(
        address = %http_addr,
        declaration = %reloader.declaration_path().display(),
        request_timeout_secs = config.timeouts.request_secs,
        read_timeout_ms = config.timeouts.read_ms,
        "Mock server ready"
    );

    Ok(Running {
        http_addr,
        admin_addr,
        reloader,
        tasks,
    })
}

fn parse_addr(address: &str) -> Result<SocketAddr, StartupError> {
    address.parse().map_err(|e: std::net::AddrParseError| StartupError::InvalidAddress {
        address: address.to_string(),
        message: e.to_string(),
    })
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    let addr = parse_addr(address)?;
    TcpListener::bind(addr).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

fn local_addr(listener: &TcpListener, address: &str) -> Result<SocketAddr, StartupError> {
    listener.local_addr().map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}
