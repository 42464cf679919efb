//! Configuration schema definitions.
//!
//! Two families of types live here:
//! - the *declaration* (`Declaration` → `Service` → `Endpoint`), authored by
//!   users and reloaded at runtime;
//! - the *server settings* (`ServerConfig`), fixed for the process lifetime.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root of a route declaration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Declaration {
    /// Services in declared order.
    pub services: Vec<Service>,
}

/// A named group of endpoints sharing a base path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Service {
    /// Service identifier for logging and the admin listing.
    #[serde(default)]
    pub name: String,

    /// Prefix prepended to every endpoint path (e.g., "/api").
    #[serde(default, rename = "basePath")]
    pub base_path: String,

    /// Endpoints in declared order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// One canned response bound to a method and path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Route pattern relative to the service base path.
    pub path: String,

    /// HTTP verb. Unsupported verbs are skipped at compile time.
    pub method: String,

    /// File whose bytes are served. Relative paths resolve against the
    /// working directory.
    #[serde(rename = "responseFile")]
    pub response_file: String,
}

/// Process-level settings for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Where the route declaration lives.
    pub declaration: DeclarationConfig,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Request and file read deadlines.
    pub timeouts: TimeoutConfig,

    /// File watching settings.
    pub watch: WatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Read-only admin surface.
    pub admin: AdminConfig,
}

/// Declaration file location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeclarationConfig {
    /// Path to the declaration, relative to the working directory.
    pub path: String,
}

impl Default for DeclarationConfig {
    fn default() -> Self {
        Self {
            path: "config.yaml".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,

    /// Deadline for reading a response file, in milliseconds.
    pub read_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            read_ms: 5_000,
        }
    }
}

/// File watching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Enable hot reload. When disabled the first table is served forever.
    pub enabled: bool,

    /// Per-path debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 100,
        }
    }
}

/// Log output style.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Log output style.
    pub log_format: LogFormat,

    /// Metrics endpoint bind address. Metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "mock_server=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin bind address. The admin listener is off when unset.
    pub bind_address: Option<String>,
}
