//! Compiled route table.
//!
//! # Responsibilities
//! - Store compiled routes keyed by (verb, full path)
//! - Look up the route for a request
//! - Carry the set of files the watcher must observe
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Static routes: O(log n) exact lookup
//! - Parameterised routes: O(n) scan in specificity order
//! - Explicit `None` on miss rather than a silent default

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use axum::http::Method;
use serde::Serialize;

use crate::routing::pattern::RoutePattern;

/// HTTP verbs a declaration may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Patch, Verb::Delete];

    /// Parse a declared method name, case-insensitively.
    pub fn parse(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(method.trim()))
    }

    /// Map a request method to the verb whose routes serve it.
    ///
    /// HEAD is answered by GET routes.
    pub fn from_method(method: &Method) -> Option<Self> {
        match method.as_str() {
            "GET" | "HEAD" => Some(Verb::Get),
            "POST" => Some(Verb::Post),
            "PUT" => Some(Verb::Put),
            "PATCH" => Some(Verb::Patch),
            "DELETE" => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a route: verb plus full path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteKey {
    pub verb: Verb,
    pub path: String,
}

impl RouteKey {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

/// A compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    key: RouteKey,
    pattern: RoutePattern,
    service: String,
    response_file: PathBuf,
}

impl RouteEntry {
    pub fn new(key: RouteKey, pattern: RoutePattern, service: String, response_file: PathBuf) -> Self {
        Self {
            key,
            pattern,
            service,
            response_file,
        }
    }

    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Name of the declaring service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Absolute path of the file served for this route.
    pub fn response_file(&self) -> &Path {
        &self.response_file
    }
}

/// Immutable mapping from route keys to entries.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    version: u64,
    entries: BTreeMap<RouteKey, RouteEntry>,
    /// Parameterised keys per verb, most specific first.
    dynamic: BTreeMap<Verb, Vec<RouteKey>>,
    watched: BTreeSet<PathBuf>,
}

impl RouteTable {
    /// Build a table from compiled entries.
    ///
    /// `watched` should already contain the declaration file; every entry's
    /// response file is added here.
    pub fn new(entries: BTreeMap<RouteKey, RouteEntry>, mut watched: BTreeSet<PathBuf>) -> Self {
        let mut dynamic: BTreeMap<Verb, Vec<&RouteEntry>> = BTreeMap::new();
        for entry in entries.values() {
            watched.insert(entry.response_file.clone());
            if !entry.pattern.is_static() {
                dynamic.entry(entry.key.verb).or_default().push(entry);
            }
        }

        let dynamic: BTreeMap<Verb, Vec<RouteKey>> = dynamic
            .into_iter()
            .map(|(verb, mut group)| {
                group.sort_by(|a, b| a.pattern.specificity_cmp(&b.pattern));
                (verb, group.into_iter().map(|e| e.key.clone()).collect())
            })
            .collect();

        Self {
            version: 0,
            entries,
            dynamic,
            watched,
        }
    }

    /// Find the route serving `path` for `verb`.
    pub fn lookup(&self, verb: Verb, path: &str) -> Option<&RouteEntry> {
        if let Some(entry) = self.entries.get(&RouteKey::new(verb, path)) {
            if entry.pattern.is_static() {
                return Some(entry);
            }
        }

        self.dynamic
            .get(&verb)?
            .iter()
            .filter_map(|key| self.entries.get(key))
            .find(|entry| entry.pattern.matches(path))
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }

    pub fn get(&self, key: &RouteKey) -> Option<&RouteEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declaration file plus every referenced response file.
    pub fn watched_paths(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }

    /// Publication version; zero until the table is published.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Same routes and watch set, ignoring the publication version.
    pub fn same_content(&self, other: &RouteTable) -> bool {
        self.entries == other.entries && self.watched == other.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(verb: Verb, path: &str, file: &str) -> (RouteKey, RouteEntry) {
        let key = RouteKey::new(verb, path);
        let pattern = RoutePattern::parse(path).unwrap();
        (
            key.clone(),
            RouteEntry::new(key, pattern, "svc".into(), PathBuf::from(file)),
        )
    }

    fn table(routes: &[(Verb, &str, &str)]) -> RouteTable {
        let entries = routes
            .iter()
            .map(|(verb, path, file)| entry(*verb, path, file))
            .collect();
        RouteTable::new(entries, BTreeSet::from([PathBuf::from("/srv/config.yaml")]))
    }

    #[test]
    fn test_verb_parse() {
        assert_eq!(Verb::parse("GET"), Some(Verb::Get));
        assert_eq!(Verb::parse("post"), Some(Verb::Post));
        assert_eq!(Verb::parse("Delete"), Some(Verb::Delete));
        assert_eq!(Verb::parse("HEAD"), None);
        assert_eq!(Verb::parse("FETCH"), None);
    }

    #[test]
    fn test_head_served_by_get() {
        assert_eq!(Verb::from_method(&Method::HEAD), Some(Verb::Get));
        assert_eq!(Verb::from_method(&Method::OPTIONS), None);
    }

    #[test]
    fn test_static_lookup() {
        let t = table(&[(Verb::Get, "/api/ping", "/srv/ping.json")]);
        let hit = t.lookup(Verb::Get, "/api/ping").unwrap();
        assert_eq!(hit.response_file(), Path::new("/srv/ping.json"));
        assert!(t.lookup(Verb::Post, "/api/ping").is_none());
        assert!(t.lookup(Verb::Get, "/api/missing").is_none());
    }

    #[test]
    fn test_dynamic_lookup_prefers_specific() {
        let t = table(&[
            (Verb::Get, "/users/*rest", "/srv/any.json"),
            (Verb::Get, "/users/{id}", "/srv/user.json"),
            (Verb::Get, "/users/me", "/srv/me.json"),
        ]);
        let file = |path| t.lookup(Verb::Get, path).unwrap().response_file().to_path_buf();
        assert_eq!(file("/users/me"), PathBuf::from("/srv/me.json"));
        assert_eq!(file("/users/7"), PathBuf::from("/srv/user.json"));
        assert_eq!(file("/users/7/posts"), PathBuf::from("/srv/any.json"));
    }

    #[test]
    fn test_pattern_text_is_not_a_static_hit() {
        let t = table(&[(Verb::Get, "/users/{id}", "/srv/user.json")]);
        // The literal request "/users/{id}" still goes through pattern matching.
        assert!(t.lookup(Verb::Get, "/users/{id}").is_some());
        assert!(t.lookup(Verb::Get, "/users").is_none());
    }

    #[test]
    fn test_watched_paths_include_response_files() {
        let t = table(&[
            (Verb::Get, "/a", "/srv/a.json"),
            (Verb::Post, "/b", "/srv/b.json"),
        ]);
        let watched: Vec<_> = t.watched_paths().iter().cloned().collect();
        assert_eq!(
            watched,
            vec![
                PathBuf::from("/srv/a.json"),
                PathBuf::from("/srv/b.json"),
                PathBuf::from("/srv/config.yaml"),
            ]
        );
    }
}
