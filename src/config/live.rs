//! Atomically swappable route table.
//!
//! Readers call [`LiveConfig::read`] once per request and keep the returned
//! snapshot for the whole request. The rebuild path hands fully built tables
//! to [`LiveConfig::publish`]; the unit of visibility is the whole table.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::routing::table::RouteTable;

/// Shared handle to the currently published route table.
///
/// Cloning is cheap; all clones observe the same table.
#[derive(Clone)]
pub struct LiveConfig {
    inner: Arc<Inner>,
}

struct Inner {
    current: ArcSwap<RouteTable>,
    /// Serialises publishers so versions follow publication order.
    /// Readers never take this lock.
    publish_lock: Mutex<u64>,
}

impl LiveConfig {
    /// Start with `table` published as version 1.
    pub fn new(mut table: RouteTable) -> Self {
        table.set_version(1);
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(table),
                publish_lock: Mutex::new(1),
            }),
        }
    }

    /// Snapshot of the current table. Wait-free.
    pub fn read(&self) -> Arc<RouteTable> {
        self.inner.current.load_full()
    }

    /// Replace the current table and return the published snapshot.
    pub fn publish(&self, mut table: RouteTable) -> Arc<RouteTable> {
        let mut version = self
            .inner
            .publish_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *version += 1;
        table.set_version(*version);

        let table = Arc::new(table);
        self.inner.current.store(Arc::clone(&table));
        table
    }

    /// Version of the current table.
    pub fn version(&self) -> u64 {
        self.inner.current.load().version()
    }
}

impl std::fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.inner.current.load();
        f.debug_struct("LiveConfig")
            .field("version", &current.version())
            .field("routes", &current.len())
            .finish()
    }
}
