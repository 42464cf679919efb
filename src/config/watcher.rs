//! File watcher for hot reload.
//!
//! # Responsibilities
//! - Watch the declaration file and every referenced response file
//! - Debounce bursts of events per path
//! - Reload on declaration changes; resubscribe after each publish
//!
//! # Design Decisions
//! - Subscriptions are on parent directories (non-recursive), filtered by
//!   exact path, so rename-on-save editors and not-yet-created files work
//! - Response files are read on every request, so their events are only
//!   logged and counted
//! - One task owns the event stream; the notify callback only forwards

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::reload::Reloader;
use crate::observability::metrics;

/// Error type for watcher setup.
#[derive(Debug, Error)]
#[error("failed to start file watcher: {0}")]
pub struct WatchError(#[from] notify::Error);

/// Watches declaration and response files and drives reloads.
pub struct RouteWatcher {
    reloader: Arc<Reloader>,
    debounce: Duration,
    watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    /// Files whose events matter.
    files: BTreeSet<PathBuf>,
    /// Directories currently subscribed.
    dirs: BTreeSet<PathBuf>,
}

impl RouteWatcher {
    /// Create a watcher subscribed to everything the current table references.
    pub fn new(reloader: Arc<Reloader>, debounce: Duration) -> Result<Self, WatchError> {
        let (tx, events) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )?;

        let mut this = Self {
            reloader,
            debounce,
            watcher,
            events,
            files: BTreeSet::new(),
            dirs: BTreeSet::new(),
        };
        let current = this.reloader.live().read();
        this.sync_subscriptions(current.watched_paths());
        Ok(this)
    }

    /// Files the watcher currently reacts to.
    pub fn watched_files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Run the event loop on the Tokio runtime until shutdown fires.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            path = %self.reloader.declaration_path().display(),
            files = self.files.len(),
            debounce_ms = self.debounce.as_millis() as u64,
            "File watcher started"
        );

        let mut pending: HashMap<PathBuf, Instant> = HashMap::new();
        loop {
            let next_due = pending.values().min().copied();
            // Placeholder deadline; the branch is disabled when nothing is pending.
            let sleep_until = next_due.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = shutdown.recv() => break,
                received = self.events.recv() => match received {
                    Some(Ok(event)) => self.note(event, &mut pending),
                    Some(Err(e)) => tracing::warn!(error = %e, "Watch error"),
                    None => break,
                },
                _ = tokio::time::sleep_until(sleep_until), if next_due.is_some() => {
                    self.flush(&mut pending).await;
                }
            }
        }

        tracing::info!("File watcher stopped");
    }

    /// Record relevant paths from an event, pushing their deadlines out.
    fn note(&self, event: Event, pending: &mut HashMap<PathBuf, Instant>) {
        if !is_content_event(&event.kind) {
            return;
        }
        let due = Instant::now() + self.debounce;
        for path in event.paths {
            if self.files.contains(&path) {
                tracing::trace!(path = %path.display(), kind = ?event.kind, "File event");
                pending.insert(path, due);
            }
        }
    }

    /// Act on every path whose debounce window has elapsed.
    async fn flush(&mut self, pending: &mut HashMap<PathBuf, Instant>) {
        let now = Instant::now();
        let due: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        let mut declaration_changed = false;
        for path in due {
            pending.remove(&path);
            if path == self.reloader.declaration_path() {
                declaration_changed = true;
                metrics::record_file_event("declaration");
            } else {
                tracing::debug!(path = %path.display(), "Response file changed");
                metrics::record_file_event("response");
            }
        }

        if !declaration_changed {
            return;
        }

        tracing::info!("Declaration change detected, reloading...");
        let reloader = Arc::clone(&self.reloader);
        match tokio::task::spawn_blocking(move || reloader.reload()).await {
            Ok(Ok(table)) => self.sync_subscriptions(table.watched_paths()),
            // Already logged by the reloader.
            Ok(Err(_)) => {}
            Err(e) => tracing::error!(error = %e, "Reload task failed"),
        }
    }

    /// Bring directory subscriptions in line with `files`.
    fn sync_subscriptions(&mut self, files: &BTreeSet<PathBuf>) {
        let wanted: BTreeSet<PathBuf> = files
            .iter()
            .filter_map(|f| f.parent().map(Path::to_path_buf))
            .collect();

        for dir in self.dirs.difference(&wanted).cloned().collect::<Vec<_>>() {
            if let Err(e) = self.watcher.unwatch(&dir) {
                tracing::debug!(dir = %dir.display(), error = %e, "Failed to unwatch directory");
            }
            self.dirs.remove(&dir);
        }

        for dir in wanted.difference(&self.dirs).cloned().collect::<Vec<_>>() {
            // Missing directories are picked up by the next successful reload.
            // Requests read from disk regardless, so only change events are lost.
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "Directory does not exist yet, not watching");
                continue;
            }
            match self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::debug!(dir = %dir.display(), "Watching directory");
                    self.dirs.insert(dir);
                }
                Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Failed to watch directory"),
            }
        }

        let added = files.difference(&self.files).count();
        let removed = self.files.difference(files).count();
        if added > 0 || removed > 0 {
            tracing::info!(added, removed, total = files.len(), "Watch set updated");
        }
        self.files = files.clone();
    }
}

fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_content_events() {
        assert!(is_content_event(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_content_event(&EventKind::Create(CreateKind::File)));
        assert!(!is_content_event(&EventKind::Access(AccessKind::Any)));
    }

    #[tokio::test]
    async fn test_initial_watch_set() {
        let dir = tempfile::tempdir().unwrap();
        let base = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::write(
            base.join("config.yaml"),
            "services:\n  - basePath: /api\n    endpoints:\n      - {path: /a, method: GET, responseFile: data/a.json}\n",
        )
        .unwrap();

        let reloader = Arc::new(Reloader::bootstrap(Path::new("config.yaml"), &base).unwrap());
        let watcher = RouteWatcher::new(reloader, Duration::from_millis(50)).unwrap();

        let files: Vec<_> = watcher.watched_files().iter().cloned().collect();
        assert_eq!(files, vec![base.join("config.yaml"), base.join("data/a.json")]);
        // data/ does not exist yet, so only the base directory is subscribed.
        assert_eq!(watcher.dirs.iter().cloned().collect::<Vec<_>>(), vec![base]);
    }

    #[tokio::test]
    async fn test_missing_directory_subscribed_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let base = std::fs::canonicalize(dir.path()).unwrap();
        let decl = base.join("config.yaml");
        std::fs::write(
            &decl,
            "services:\n  - endpoints:\n      - {path: /a, method: GET, responseFile: later/a.json}\n",
        )
        .unwrap();

        let reloader = Arc::new(Reloader::bootstrap(Path::new("config.yaml"), &base).unwrap());
        let mut watcher = RouteWatcher::new(reloader.clone(), Duration::from_millis(1)).unwrap();
        assert!(watcher.watched_files().contains(&base.join("later/a.json")));
        assert!(!watcher.dirs.contains(&base.join("later")));

        std::fs::create_dir(base.join("later")).unwrap();
        let mut pending = HashMap::new();
        watcher.note(modify(&decl), &mut pending);
        tokio::time::sleep(Duration::from_millis(10)).await;
        watcher.flush(&mut pending).await;

        assert_eq!(reloader.live().version(), 2);
        assert!(watcher.dirs.contains(&base.join("later")));
    }

    fn modify(path: &Path) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.to_path_buf())
    }

    #[tokio::test]
    async fn test_burst_coalesces_into_one_reload() {
        let dir = tempfile::tempdir().unwrap();
        let base = std::fs::canonicalize(dir.path()).unwrap();
        let decl = base.join("config.yaml");
        std::fs::write(&decl, "services: []\n").unwrap();

        let reloader = Arc::new(Reloader::bootstrap(Path::new("config.yaml"), &base).unwrap());
        let mut watcher = RouteWatcher::new(reloader.clone(), Duration::from_millis(20)).unwrap();

        let mut pending = HashMap::new();
        for _ in 0..5 {
            watcher.note(modify(&decl), &mut pending);
        }
        watcher.note(modify(&base.join("unrelated.txt")), &mut pending);
        assert_eq!(pending.len(), 1);

        // Nothing is due inside the window.
        watcher.flush(&mut pending).await;
        assert_eq!(reloader.live().version(), 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        watcher.flush(&mut pending).await;
        assert!(pending.is_empty());
        assert_eq!(reloader.live().version(), 2);
    }

    #[tokio::test]
    async fn test_reload_updates_watch_set() {
        let dir = tempfile::tempdir().unwrap();
        let base = std::fs::canonicalize(dir.path()).unwrap();
        let decl = base.join("config.yaml");
        std::fs::write(
            &decl,
            "services:\n  - basePath: /api\n    endpoints:\n      - {path: /a, method: GET, responseFile: a.json}\n",
        )
        .unwrap();

        let reloader = Arc::new(Reloader::bootstrap(Path::new("config.yaml"), &base).unwrap());
        let mut watcher = RouteWatcher::new(reloader.clone(), Duration::from_millis(1)).unwrap();
        assert!(watcher.watched_files().contains(&base.join("a.json")));

        std::fs::create_dir(base.join("data")).unwrap();
        std::fs::write(
            &decl,
            "services:\n  - basePath: /api\n    endpoints:\n      - {path: /b, method: GET, responseFile: data/b.json}\n",
        )
        .unwrap();

        let mut pending = HashMap::new();
        watcher.note(modify(&decl), &mut pending);
        tokio::time::sleep(Duration::from_millis(10)).await;
        watcher.flush(&mut pending).await;

        assert!(watcher.watched_files().contains(&base.join("data/b.json")));
        assert!(!watcher.watched_files().contains(&base.join("a.json")));
        assert!(watcher.dirs.contains(&base.join("data")));
    }
}
