//! Declaration → route table compilation.
//!
//! # Responsibilities
//! - Walk services then endpoints in declared order
//! - Join base path and endpoint path into the full route path
//! - Resolve response files to absolute paths against a fixed base directory
//! - Report skipped endpoints and key collisions as warnings
//!
//! # Design Decisions
//! - Compilation never fails; problems become warnings and the endpoint is skipped
//! - Duplicate keys: last declared wins, including patterns that differ only
//!   in parameter spelling
//! - Missing response files are fine here; dispatch reports them
//! - The base directory is captured once so the output is deterministic

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::config::schema::Declaration;
use crate::routing::pattern::{PatternError, RoutePattern};
use crate::routing::table::{RouteEntry, RouteKey, RouteTable, Verb};

/// Non-fatal problems found while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// The endpoint names a verb the server does not serve.
    UnsupportedMethod {
        service: String,
        method: String,
        path: String,
    },
    /// A later endpoint replaced an earlier one with the same key.
    DuplicateRoute {
        key: RouteKey,
        replaced: PathBuf,
        winner: PathBuf,
    },
    /// The full path is not a valid route pattern.
    InvalidPattern {
        service: String,
        path: String,
        error: PatternError,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::UnsupportedMethod { service, method, path } => {
                write!(f, "service {service:?}: unsupported method {method:?} for {path}, endpoint skipped")
            }
            CompileWarning::DuplicateRoute { key, replaced, winner } => write!(
                f,
                "duplicate route {key}: {} replaces {}",
                winner.display(),
                replaced.display()
            ),
            CompileWarning::InvalidPattern { service, path, error } => {
                write!(f, "service {service:?}: invalid route {path:?} ({error}), endpoint skipped")
            }
        }
    }
}

/// Output of a compilation pass.
#[derive(Debug)]
pub struct Compiled {
    pub table: RouteTable,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles declarations into route tables.
#[derive(Debug, Clone)]
pub struct RouteCompiler {
    declaration_path: PathBuf,
    base_dir: PathBuf,
}

impl RouteCompiler {
    /// `base_dir` is the directory relative response files resolve against.
    pub fn new(declaration_path: &Path, base_dir: &Path) -> Self {
        Self {
            declaration_path: resolve_path(base_dir, declaration_path),
            base_dir: normalize_path(base_dir),
        }
    }

    /// Absolute path of the declaration file.
    pub fn declaration_path(&self) -> &Path {
        &self.declaration_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build a route table from a declaration.
    pub fn compile(&self, declaration: &Declaration) -> Compiled {
        let mut entries: BTreeMap<RouteKey, RouteEntry> = BTreeMap::new();
        // Canonical pattern per verb → key of the entry currently holding it.
        let mut claimed: HashMap<(Verb, String), RouteKey> = HashMap::new();
        let mut warnings = Vec::new();

        for service in &declaration.services {
            for endpoint in &service.endpoints {
                let full_path = join_route(&service.base_path, &endpoint.path);

                let Some(verb) = Verb::parse(&endpoint.method) else {
                    warnings.push(CompileWarning::UnsupportedMethod {
                        service: service.name.clone(),
                        method: endpoint.method.clone(),
                        path: full_path,
                    });
                    continue;
                };

                let pattern = match RoutePattern::parse(&full_path) {
                    Ok(p) => p,
                    Err(error) => {
                        warnings.push(CompileWarning::InvalidPattern {
                            service: service.name.clone(),
                            path: full_path,
                            error,
                        });
                        continue;
                    }
                };

                let key = RouteKey::new(verb, full_path);
                let response_file = resolve_path(&self.base_dir, Path::new(&endpoint.response_file));

                // `/users/:id` and `/users/{uid}` are the same route.
                let previous = claimed
                    .insert((verb, pattern.canonical()), key.clone())
                    .and_then(|previous_key| entries.remove(&previous_key));
                if let Some(previous) = previous {
                    warnings.push(CompileWarning::DuplicateRoute {
                        key: key.clone(),
                        replaced: previous.response_file().to_path_buf(),
                        winner: response_file.clone(),
                    });
                }

                let entry = RouteEntry::new(key.clone(), pattern, service.name.clone(), response_file);
                entries.insert(key, entry);
            }
        }

        let watched = BTreeSet::from([self.declaration_path.clone()]);
        Compiled {
            table: RouteTable::new(entries, watched),
            warnings,
        }
    }
}

/// Concatenate a base path and an endpoint path.
///
/// A trailing `/` on the base is dropped when the endpoint path starts with
/// one; an empty result becomes `/`.
pub fn join_route(base_path: &str, path: &str) -> String {
    let base = if path.starts_with('/') {
        base_path.strip_suffix('/').unwrap_or(base_path)
    } else {
        base_path
    };
    let joined = format!("{base}{path}");
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Make `path` absolute against `base_dir` and normalize it lexically.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base_dir.join(path))
    }
}

/// Remove `.` components and fold `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
