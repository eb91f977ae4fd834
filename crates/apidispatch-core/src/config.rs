//! Project configuration for validation and dispatch

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::verdict::FindingKind;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default specification document (used when none is given on the command line)
    #[serde(default)]
    pub spec: Option<PathBuf>,

    /// Module searched for handlers when an operation carries no controller hint
    #[serde(default)]
    pub methods_module: Option<String>,

    /// Take the API title of each added document
    #[serde(default = "default_true")]
    pub overwrite_name: bool,

    /// Directory holding replacement grammar files
    #[serde(default)]
    pub schemas_dir: Option<PathBuf>,

    /// Known handlers: dotted module path -> handler names
    #[serde(default)]
    pub handlers: BTreeMap<String, Vec<String>>,

    /// Finding kinds left out of reports and verdicts
    #[serde(default)]
    pub ignore: Vec<FindingKind>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec: None,
            methods_module: None,
            overwrite_name: true,
            schemas_dir: None,
            handlers: BTreeMap::new(),
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apidispatch.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first default config file found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".apidispatch.toml", ".apidispatch.json", "apidispatch.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apidispatch configuration

# Default specification document (Swagger 1.2/2.0 or OpenAPI 3.x, JSON or YAML)
# spec = "openapi.yaml"

# Module searched for handlers when an operation has no
# x-swagger-router-controller hint
# methods_module = "handlers"

# Use the title of each added API as the dispatcher name (default: true)
# overwrite_name = true

# Replace the bundled grammars with files from this directory
# (swagger-1.2.json, swagger-2.0.json, openapi-3.json)
# schemas_dir = "schemas"

# Finding kinds to leave out of reports and verdicts
# (unknown_dialect, schema_violation, broken_reference, unresolved_handler)
# ignore = ["unresolved_handler"]

# Known handlers per module
[handlers]
# handlers = ["listPets", "showPetById"]
# "controllers.pets" = ["createPets"]
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
