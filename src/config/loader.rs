//! Declaration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::Declaration;
use crate::config::validation::{validate_declaration, ValidationError};

/// Error type for declaration loading.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {} as {format}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: DeclarationFormat,
        message: String,
    },
    #[error("invalid declaration {}: {}", .path.display(), join_errors(.errors))]
    Validation {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text formats a declaration may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    Toml,
    Yaml,
    Json,
}

impl DeclarationFormat {
    /// Pick the format from the file extension. Unknown extensions are TOML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => DeclarationFormat::Yaml,
            Some("json") => DeclarationFormat::Json,
            _ => DeclarationFormat::Toml,
        }
    }

    /// Parse declaration text in this format.
    pub fn parse(self, content: &str) -> Result<Declaration, String> {
        match self {
            DeclarationFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DeclarationFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DeclarationFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

impl std::fmt::Display for DeclarationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationFormat::Toml => write!(f, "TOML"),
            DeclarationFormat::Yaml => write!(f, "YAML"),
            DeclarationFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Load and validate a declaration file.
///
/// Every call returns a fresh value; nothing is shared with earlier loads.
pub fn load_declaration(path: &Path) -> Result<Declaration, DeclarationError> {
    let content = fs::read_to_string(path).map_err(|source| DeclarationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let format = DeclarationFormat::from_path(path);
    let declaration = format.parse(&content).map_err(|message| DeclarationError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    })?;

    validate_declaration(&declaration).map_err(|errors| DeclarationError::Validation {
        path: path.to_path_buf(),
        errors,
    })?;

    Ok(declaration)
}
