//! Declaration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every full route path is a valid pattern
//! - Check methods are HTTP tokens and response files are named
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Declaration → Result<(), Vec<ValidationError>>
//! - Unknown but well-formed verbs pass; the compiler skips them with a warning

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::Declaration;
use crate::routing::compiler::join_route;
use crate::routing::pattern::{PatternError, RoutePattern};

/// A single semantic problem in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service {service:?}: invalid route {path:?}: {error}")]
    InvalidRoute {
        service: String,
        path: String,
        error: PatternError,
    },
    #[error("service {service:?}: {path}: method {method:?} is not an HTTP method token")]
    InvalidMethod {
        service: String,
        path: String,
        method: String,
    },
    #[error("service {service:?}: {path}: responseFile is empty")]
    EmptyResponseFile { service: String, path: String },
}

/// Validate a parsed declaration.
pub fn validate_declaration(declaration: &Declaration) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for service in &declaration.services {
        for endpoint in &service.endpoints {
            let path = join_route(&service.base_path, &endpoint.path);

            if let Err(error) = RoutePattern::parse(&path) {
                errors.push(ValidationError::InvalidRoute {
                    service: service.name.clone(),
                    path: path.clone(),
                    error,
                });
            }

            let method = endpoint.method.trim();
            if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    service: service.name.clone(),
                    path: path.clone(),
                    method: endpoint.method.clone(),
                });
            }

            if endpoint.response_file.trim().is_empty() {
                errors.push(ValidationError::EmptyResponseFile {
                    service: service.name.clone(),
                    path,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
