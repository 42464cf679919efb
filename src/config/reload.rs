//! Load → compile → publish.
//!
//! # Design Decisions
//! - The first load is fatal: with no table there is nothing to serve
//! - Later failures are logged and the previous table stays published
//! - Compile warnings are logged on every pass, never fatal

use std::path::Path;
use std::sync::Arc;

use crate::config::live::LiveConfig;
use crate::config::loader::{load_declaration, DeclarationError};
use crate::observability::metrics;
use crate::routing::compiler::{Compiled, CompileWarning, RouteCompiler};
use crate::routing::table::RouteTable;

/// Owns the declaration location and the live table it feeds.
#[derive(Debug)]
pub struct Reloader {
    compiler: RouteCompiler,
    live: LiveConfig,
}

impl Reloader {
    /// Perform the initial load and publish the first table.
    ///
    /// `declaration_path` may be relative to `base_dir`.
    pub fn bootstrap(declaration_path: &Path, base_dir: &Path) -> Result<Self, DeclarationError> {
        let compiler = RouteCompiler::new(declaration_path, base_dir);
        let table = build(&compiler)?;
        tracing::info!(
            path = %compiler.declaration_path().display(),
            routes = table.len(),
            "Declaration loaded"
        );
        metrics::record_route_count(table.len());

        Ok(Self {
            live: LiveConfig::new(table),
            compiler,
        })
    }

    /// Rebuild from disk and publish. On failure the current table is kept.
    pub fn reload(&self) -> Result<Arc<RouteTable>, DeclarationError> {
        match build(&self.compiler) {
            Ok(table) => {
                let published = self.live.publish(table);
                tracing::info!(
                    version = published.version(),
                    routes = published.len(),
                    "Route table reloaded"
                );
                metrics::record_reload("success");
                metrics::record_route_count(published.len());
                Ok(published)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    version = self.live.version(),
                    "Failed to reload declaration. Keeping current route table."
                );
                metrics::record_reload("failure");
                Err(e)
            }
        }
    }

    /// Handle to the live table.
    pub fn live(&self) -> &LiveConfig {
        &self.live
    }

    /// Absolute path of the declaration file.
    pub fn declaration_path(&self) -> &Path {
        self.compiler.declaration_path()
    }
}

fn build(compiler: &RouteCompiler) -> Result<RouteTable, DeclarationError> {
    let declaration = load_declaration(compiler.declaration_path())?;
    let Compiled { table, warnings } = compiler.compile(&declaration);
    for warning in &warnings {
        log_warning(warning);
    }
    Ok(table)
}

fn log_warning(warning: &CompileWarning) {
    match warning {
        CompileWarning::UnsupportedMethod { .. } => {
            tracing::warn!(kind = "unsupported_method", "{}", warning)
        }
        CompileWarning::DuplicateRoute { .. } => {
            tracing::warn!(kind = "duplicate_route", "{}", warning)
        }
        CompileWarning::InvalidPattern { .. } => {
            tracing::warn!(kind = "invalid_pattern", "{}", warning)
        }
    }
}
