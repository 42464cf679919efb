//! Mock JSON server with a live, hot-reloaded route table.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{LiveConfig, Reloader, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
