//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load declaration → Publish first table → Start watcher → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Watcher stops, listeners drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: declaration first, then watcher, then listeners
//! - A bad declaration at startup is fatal; later ones are not

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
