//! Table-driven request dispatch.
//!
//! Every request takes one snapshot of the live table, looks up its route,
//! and reads the response file from disk under a deadline.

use std::path::Path;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::Method;

use crate::config::live::LiveConfig;
use crate::routing::table::Verb;

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Route matched and the file was read.
    Found(Bytes),
    /// No route for this method and path.
    NotFound,
    /// Route matched but the file could not be read in time.
    ServerError(String),
}

/// Resolves requests against the live table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    live: LiveConfig,
    read_timeout: Duration,
}

impl Dispatcher {
    pub fn new(live: LiveConfig, read_timeout: Duration) -> Self {
        Self { live, read_timeout }
    }

    pub fn live(&self) -> &LiveConfig {
        &self.live
    }

    /// Dispatch a request by method and path.
    pub async fn handle(&self, method: &Method, path: &str) -> Dispatch {
        let Some(verb) = Verb::from_method(method) else {
            return Dispatch::NotFound;
        };

        let table = self.live.read();
        let Some(entry) = table.lookup(verb, path) else {
            return Dispatch::NotFound;
        };

        tracing::trace!(
            route = %entry.key(),
            version = table.version(),
            file = %entry.response_file().display(),
            "Route matched"
        );
        read_with_deadline(entry.response_file(), self.read_timeout).await
    }
}

async fn read_with_deadline(path: &Path, deadline: Duration) -> Dispatch {
    match tokio::time::timeout(deadline, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => Dispatch::Found(Bytes::from(bytes)),
        Ok(Err(e)) => Dispatch::ServerError(format!("failed to read {}: {e}", path.display())),
        Err(_) => Dispatch::ServerError(format!(
            "timed out after {}ms reading {}",
            deadline.as_millis(),
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::config::reload::Reloader;

    fn setup() -> (tempfile::TempDir, Dispatcher) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "services:\n  - name: api\n    basePath: /api\n    endpoints:\n      - {path: /ping, method: GET, responseFile: ping.json}\n",
        )
        .unwrap();
        fs::write(dir.path().join("ping.json"), r#"{"ok":true}"#).unwrap();

        let reloader = Reloader::bootstrap(Path::new("config.yaml"), dir.path()).unwrap();
        let dispatcher = Dispatcher::new(reloader.live().clone(), Duration::from_secs(1));
        (dir, dispatcher)
    }

    #[tokio::test]
    async fn test_hit_returns_file_bytes() {
        let (_dir, dispatcher) = setup();
        assert_eq!(
            dispatcher.handle(&Method::GET, "/api/ping").await,
            Dispatch::Found(Bytes::from_static(br#"{"ok":true}"#))
        );
    }

    #[tokio::test]
    async fn test_head_uses_get_route() {
        let (_dir, dispatcher) = setup();
        assert!(matches!(
            dispatcher.handle(&Method::HEAD, "/api/ping").await,
            Dispatch::Found(_)
        ));
    }

    #[tokio::test]
    async fn test_miss_and_method_mismatch() {
        let (_dir, dispatcher) = setup();
        assert_eq!(dispatcher.handle(&Method::GET, "/api/missing").await, Dispatch::NotFound);
        assert_eq!(dispatcher.handle(&Method::POST, "/api/ping").await, Dispatch::NotFound);
        assert_eq!(dispatcher.handle(&Method::OPTIONS, "/api/ping").await, Dispatch::NotFound);
    }

    #[tokio::test]
    async fn test_deleted_file_is_server_error() {
        let (dir, dispatcher) = setup();
        fs::remove_file(dir.path().join("ping.json")).unwrap();

        match dispatcher.handle(&Method::GET, "/api/ping").await {
            Dispatch::ServerError(message) => assert!(message.contains("ping.json")),
            other => panic!("expected server error, got {other:?}"),
        }
        // The dangling entry stays until the next reload.
        assert!(dispatcher.live().read().lookup(Verb::Get, "/api/ping").is_some());
    }

    #[tokio::test]
    async fn test_content_changes_are_read_through() {
        let (dir, dispatcher) = setup();
        fs::write(dir.path().join("ping.json"), r#"{"ok":false}"#).unwrap();
        assert_eq!(
            dispatcher.handle(&Method::GET, "/api/ping").await,
            Dispatch::Found(Bytes::from_static(br#"{"ok":false}"#))
        );
    }
}
