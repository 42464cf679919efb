//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (startup and every reload):
//!     Declaration
//!     → compiler.rs (join paths, resolve files, last-wins on collision)
//!     → pattern.rs (parse route patterns)
//!     → table.rs (freeze as immutable RouteTable)
//!
//! Incoming Request (method, path)
//!     → table.rs (exact lookup, then pattern scan)
//!     → Return: matched RouteEntry or None
//! ```
//!
//! # Design Decisions
//! - Tables compiled off the request path, immutable once published
//! - No regex in hot path
//! - Deterministic: same declaration always compiles to the same table
//! - Most specific pattern wins

pub mod compiler;
pub mod pattern;
pub mod table;

pub use compiler::{CompileWarning, Compiled, RouteCompiler};
pub use pattern::RoutePattern;
pub use table::{RouteEntry, RouteKey, RouteTable, Verb};
