//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\album-tidy\config.toml
//! - macOS: ~/Library/Application Support/album-tidy/config.toml
//! - Linux: ~/.config/album-tidy/config.toml
//!
//! ```toml
//! [storage]
//! source = "/music/incoming"
//! destination = "/music/library"
//! ```
//!
//! Command-line options and environment variables override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store roots
    pub storage: StorageConfig,
}

/// Where albums are read from and moved to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the incoming tree
    pub source: Option<PathBuf>,

    /// Root of the organized library
    pub destination: Option<PathBuf>,
}

impl Config {
    /// Replace configured roots with any that were given explicitly.
    pub fn with_overrides(mut self, source: Option<PathBuf>, destination: Option<PathBuf>) -> Self {
        if source.is_some() {
            self.storage.source = source;
        }
        if destination.is_some() {
            self.storage.destination = destination;
        }
        self
    }

    pub fn source_root(&self) -> crate::error::Result<&Path> {
        self.storage
            .source
            .as_deref()
            .ok_or_else(|| Error::config("no source directory configured (use --source)"))
    }

    pub fn destination_root(&self) -> crate::error::Result<&Path> {
        self.storage.destination.as_deref().ok_or_else(|| {
            Error::config("no destination directory configured (use --destination)")
        })
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("album-tidy"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// A missing file yields defaults; a file that exists but cannot be read or
/// parsed is an error.
pub fn load() -> Result<Config, ConfigError> {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Ok(Config::default());
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    load_from(&path)
}

/// Load configuration from an explicit file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::config(e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
