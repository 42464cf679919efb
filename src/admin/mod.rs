//! Read-only admin surface.
//!
//! Served on its own listener so it never shadows a mocked route.

pub mod handlers;

use axum::{routing::get, Router};

use crate::config::live::LiveConfig;
use self::handlers::*;

pub fn setup_admin_router(live: LiveConfig) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .with_state(live)
}
