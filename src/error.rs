//! Error types for guidance projection, document loading, and draft validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while projecting a full contract into a guidance contract.
///
/// Every variant carries the offending identifier. A projection that fails
/// returns only the error; the partially edited document is dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuidanceError {
    /// The path is absent, or `verb` is set and the path lacks that operation.
    #[error("contract not found: {}", describe_contract(path, verb.as_deref()))]
    ContractNotFound { path: String, verb: Option<String> },

    #[error("schema not found: \"{name}\" is not a component schema")]
    SchemaNotFound { name: String },

    #[error("unsupported use case \"{value}\"")]
    UnsupportedUseCase { value: String },

    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },
}

fn describe_contract(path: &str, verb: Option<&str>) -> String {
    match verb {
        Some(verb) => format!("path \"{}\" has no {} operation", path, verb),
        None => format!("no path matching \"{}\"", path),
    }
}

impl GuidanceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading or rendering a contract document or policy table.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid policy table: {source}")]
    InvalidPolicy {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render document: {message}")]
    Render { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during draft validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Guidance(#[from] GuidanceError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Guidance(e) => e.exit_code(),
            ValidateError::Invalid { .. } => 1,
        }
    }
}
