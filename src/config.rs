// src/config.rs

//! Tool configuration
//!
//! Defaults can be overridden by an optional TOML config file
//! (`~/.config/ladle/config.toml`), which is in turn overridden by CLI
//! flags. A missing config file is not an error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default install root when neither config nor CLI specify one
pub const DEFAULT_INSTALL_ROOT: &str = "/usr/local";

/// Resolved configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory install destinations are relative to
    pub install_root: PathBuf,

    /// Cache directory (holds verified archives)
    ///
    /// Defaults to the user cache dir at load time when unset.
    pub cache_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            cache_dir: None,
            http_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Default config file location: `<user config dir>/ladle/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ladle").join("config.toml"))
    }

    /// Load from an explicit file path
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::ParseError(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Load the effective config
    ///
    /// An explicit `--config` path must exist; the default location is
    /// optional and silently skipped when absent.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            debug!("Loading config from {}", path.display());
            return Self::load_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("Loading config from {}", path.display());
                Self::load_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
