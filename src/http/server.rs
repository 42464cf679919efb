//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatch handler as its only route
//! - Wire up middleware (tracing, request timeout, request ID)
//! - Serve until the shutdown signal fires

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::live::LiveConfig;
use crate::config::ServerConfig;
use crate::http::dispatch::{Dispatch, Dispatcher};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// HTTP server for the mock routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that dispatches against `live`.
    pub fn new(config: &ServerConfig, live: LiveConfig) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(live, Duration::from_millis(config.timeouts.read_ms)),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Every path goes to the fallback so the live table, not the framework,
    /// decides what matches.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single handler for every request.
async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let path = uri.path();

    let outcome = state.dispatcher.handle(&method, path).await;
    let status = outcome.status();

    match &outcome {
        Dispatch::Found(bytes) => tracing::debug!(
            request_id = %request_id(&headers),
            method = %method,
            path = %path,
            bytes = bytes.len(),
            "Served mock response"
        ),
        Dispatch::NotFound => tracing::debug!(
            request_id = %request_id(&headers),
            method = %method,
            path = %path,
            "No route matched"
        ),
        Dispatch::ServerError(message) => tracing::error!(
            request_id = %request_id(&headers),
            method = %method,
            path = %path,
            error = %message,
            "Failed to serve mock response"
        ),
    }

    metrics::record_request(method.as_str(), status.as_u16(), start_time);
    outcome.into_response()
}
