//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! declaration file (YAML/TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → routing::compiler (Declaration → RouteTable)
//!     → live.rs (atomic swap of Arc<RouteTable>)
//!
//! On file change:
//!     watcher.rs detects change (debounced per path)
//!     → reload.rs loads, compiles, publishes
//!     → watcher.rs resubscribes to the new watch set
//!     → dispatch observes the new table on its next request
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once built; changes require full rebuild
//! - A failed reload keeps the last good table
//! - Validation separates syntactic (serde) from semantic checks

pub mod live;
pub mod loader;
pub mod reload;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use live::LiveConfig;
pub use loader::{load_declaration, DeclarationError};
pub use reload::Reloader;
pub use schema::{Declaration, Endpoint, Service};
pub use schema::ServerConfig;
pub use watcher::RouteWatcher;
