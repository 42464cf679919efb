//! Mock JSON server with live route reloading.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                     MOCK SERVER                       │
//!                     │                                                       │
//!   Client Request    │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│  dispatch  │───▶│ live config  │   │
//!                     │  │ server  │    │            │    │ (ArcSwap)    │   │
//!                     │  └─────────┘    └─────┬──────┘    └──────▲───────┘   │
//!                     │                       │ read file        │ publish   │
//!   Client Response   │                       ▼                  │           │
//!   ◀─────────────────┼──────────────── response file      ┌─────┴──────┐    │
//!                     │                                     │  reloader  │    │
//!                     │  ┌──────────────┐   change events   │  loader +  │    │
//!                     │  │   watcher    │──────────────────▶│  compiler  │    │
//!                     │  │  (debounce)  │                   └────────────┘    │
//!                     │  └──────────────┘                                     │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mock_server::config::schema::LogFormat;
use mock_server::config::ServerConfig;
use mock_server::lifecycle::{signals, startup, Shutdown};
use mock_server::observability::logging;

#[derive(Parser)]
#[command(name = "mock-server")]
#[command(about = "Serve canned JSON responses from a live-reloaded route declaration", long_about = None)]
struct Cli {
    /// Route declaration file (YAML, TOML or JSON).
    #[arg(short, long, default_value = "config.yaml")]
    declaration: String,

    /// Address the mock routes are served on.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Per-file debounce window for change events.
    #[arg(long, default_value_t = 100)]
    debounce_ms: u64,

    /// Serve the first declaration forever.
    #[arg(long)]
    no_watch: bool,

    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Deadline for reading one response file.
    #[arg(long, default_value_t = 5_000)]
    read_timeout_ms: u64,

    /// Enable the read-only admin API on this address.
    #[arg(long)]
    admin_bind: Option<String>,

    /// Enable the Prometheus exporter on this address.
    #[arg(long)]
    metrics_bind: Option<String>,

    #[arg(long, value_enum, default_value_t = CliLogFormat::Pretty)]
    log_format: CliLogFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliLogFormat {
    Pretty,
    Compact,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.declaration.path = self.declaration;
        config.listener.bind_address = self.bind;
        config.watch.enabled = !self.no_watch;
        config.watch.debounce_ms = self.debounce_ms;
        config.timeouts.request_secs = self.request_timeout_secs;
        config.timeouts.read_ms = self.read_timeout_ms;
        config.admin.bind_address = self.admin_bind;
        config.observability.metrics_address = self.metrics_bind;
        config.observability.log_format = match self.log_format {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Compact => LogFormat::Compact,
        };
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config();
    logging::init(&config.observability);

    tracing::info!("mock-server v{} starting", env!("CARGO_PKG_VERSION"));

    let base_dir: PathBuf = std::env::current_dir()?.canonicalize()?;
    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let running = match startup::start(config, &base_dir, &shutdown).await {
        Ok(running) => running,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };
    running.wait().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
