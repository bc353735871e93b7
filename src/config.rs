//! Configuration file handling.
//!
//! This module loads the optional `.spanner_gen.json` file. Values given on the
//! command line take priority over the file, and the file over the defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const CONFIG_FILE_NAME: &str = ".spanner_gen.json";

const DEFAULT_RUNTIME_PATH: &str = "spanner_gen::runtime";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Module path generated code reaches the runtime through
    pub runtime_path: String,
    /// Directory generated files are written under
    pub out_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            out_dir: PathBuf::from("."),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load `.spanner_gen.json` from the current directory, or defaults if absent.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicitly named configuration file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file if it cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration for an optional `--config` flag.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }
}
