//! Shared utilities for integration tests.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use mock_server::config::ServerConfig;
use mock_server::lifecycle::startup::{self, Running};
use mock_server::lifecycle::Shutdown;
use tempfile::TempDir;

pub const PING_DECLARATION: &str = r#"
services:
  - name: api
    basePath: /api
    endpoints:
      - path: /ping
        method: GET
        responseFile: ping.json
"#;

/// A scratch directory holding a declaration and its response files.
pub struct Fixture {
    _dir: TempDir,
    pub base: PathBuf,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        // Watch events report canonical paths on some platforms.
        let base = std::fs::canonicalize(dir.path()).unwrap();
        Self { _dir: dir, base }
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.base.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.base.join(name)).unwrap();
    }

    /// Start the full server on ephemeral ports.
    pub async fn start(&self, debounce_ms: u64) -> (Running, Shutdown) {
        let mut config = ServerConfig::default();
        config.declaration.path = "config.yaml".into();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.admin.bind_address = Some("127.0.0.1:0".into());
        config.watch.debounce_ms = debounce_ms;
        config.timeouts.read_ms = 1_000;

        let shutdown = Shutdown::new();
        let running = startup::start(config, &self.base, &shutdown).await.unwrap();
        (running, shutdown)
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `check` until it returns true or `timeout` elapses.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
