//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID assigned)
//!     → dispatch.rs (snapshot live table, look up route, read file)
//!     → response.rs (200 JSON / 404 / 500 JSON error)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{Dispatch, Dispatcher};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
