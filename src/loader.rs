//! Contract document loading and rendering.
//!
//! Handles loading documents from files, strings, and HTTP URLs, in JSON or
//! YAML, and rendering a projected document back to either.

use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::model::Document;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Output syntax for [`render_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Json,
    JsonPretty,
    #[default]
    Yaml,
}

impl Format {
    /// Parse a `--format` value (`yaml`, `json`).
    pub fn parse(s: &str, pretty: bool) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" if pretty => Some(Format::JsonPretty),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Load a document from a file path. `.json` files are parsed as JSON,
/// anything else goes through [`load_document_str`].
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or a parse
/// error if the content isn't a valid document.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let content = read_source(path)?;
    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content),
        Some("yaml") | Some("yml") => parse_yaml(&content),
        _ => load_document_str(&content),
    }?;
    debug!(
        path = %path.display(),
        paths = document.paths.len(),
        schemas = document.components.schemas.len(),
        "loaded document"
    );
    Ok(document)
}

/// Load a document from JSON or YAML text. Text starting with `{` is
/// treated as JSON.
pub fn load_document_str(content: &str) -> Result<Document, LoadError> {
    if content.trim_start().starts_with('{') {
        parse_json(content)
    } else {
        parse_yaml(content)
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails, or a parse error
/// if the body isn't a valid document.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Document, LoadError> {
    let network = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    // Check for HTTP errors before parsing
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network)?;

    load_document_str(&body)
}

/// Load a document from a file path or, with the `remote` feature, a URL.
pub fn load_document_auto(source: &str) -> Result<Document, LoadError> {
    #[cfg(feature = "remote")]
    if is_url(source) {
        return load_document_url(source);
    }
    load_document(Path::new(source))
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Render a document as OpenAPI JSON or YAML text.
pub fn render_document(document: &Document, format: Format) -> Result<String, LoadError> {
    let render = |message: String| LoadError::Render { message };
    match format {
        Format::Json => serde_json::to_string(document).map_err(|e| render(e.to_string())),
        Format::JsonPretty => {
            serde_json::to_string_pretty(document).map_err(|e| render(e.to_string()))
        }
        Format::Yaml => serde_yaml::to_string(document).map_err(|e| render(e.to_string())),
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json(content: &str) -> Result<Document, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

fn parse_yaml(content: &str) -> Result<Document, LoadError> {
    serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })
}
