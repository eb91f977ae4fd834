//! Document loading: JSON or YAML file, or an already parsed value
//!
//! The extension decides the parser. There is no content sniffing: a file
//! that is neither `.json`, `.yml` nor `.yaml` is rejected.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// A document to load.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// File on disk
    Path(PathBuf),
    /// Already parsed document
    Value(Value),
}

impl DocumentSource {
    /// Label for logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Value(_) => "<memory>".to_string(),
        }
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for DocumentSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<Value> for DocumentSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Serialization format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Format implied by a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unsupported document format: {0} (expected .json, .yml or .yaml)")]
    UnsupportedFormat(PathBuf),
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },
}

/// Load a document from a path or pass an in-memory value through.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for unknown extensions,
/// [`LoadError::Io`] when the file cannot be read, and
/// [`LoadError::Parse`] for malformed JSON/YAML.
pub fn load(source: impl Into<DocumentSource>) -> Result<Value, LoadError> {
    match source.into() {
        DocumentSource::Value(value) => Ok(value),
        DocumentSource::Path(path) => load_path(&path),
    }
}

fn load_path(path: &Path) -> Result<Value, LoadError> {
    let format =
        Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, format, &path.display().to_string())
}

/// Parse document text that is already in memory.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for malformed input.
pub fn load_str(content: &str, format: Format) -> Result<Value, LoadError> {
    parse(content, format, "<memory>")
}

fn parse(content: &str, format: Format, origin: &str) -> Result<Value, LoadError> {
    let parsed = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {e}")),
        Format::Yaml => serde_yml::from_str(content).map_err(|e| format!("Invalid YAML: {e}")),
    };
    parsed.map_err(|message| LoadError::Parse {
        origin: origin.to_string(),
        message,
    })
}
