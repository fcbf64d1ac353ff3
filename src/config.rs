//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\midx\config.toml
//! - macOS: ~/Library/Application Support/midx/config.toml
//! - Linux: ~/.config/midx/config.toml
//!
//! The file only names where the catalog lives. Command-line flags and
//! environment variables override it. Unless set explicitly, the art cache
//! is the `art` directory next to the database file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog storage locations
    pub catalog: CatalogConfig,
}

/// Where the database and the art cache are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite database file
    pub database: PathBuf,

    /// Directory of cached album art; `<database dir>/art` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub art_cache: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            art_cache: None,
        }
    }
}

impl CatalogConfig {
    /// The art cache directory in effect.
    pub fn art_cache_dir(&self) -> PathBuf {
        match &self.art_cache {
            Some(dir) => dir.clone(),
            None => sibling_art_dir(&self.database),
        }
    }
}

/// The `art` directory next to a database file.
pub fn sibling_art_dir(database: &Path) -> PathBuf {
    match database.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.join("art"),
        None => PathBuf::from("art"),
    }
}

/// `<data dir>/midx/catalog.db`, or `midx.db` in the working directory
/// when the platform has no data dir.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("midx").join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from(crate::db::DEFAULT_DB_NAME))
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("midx"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location.
///
/// Returns default config if file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!(target: "midx::config", "Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from `path`.
///
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!(target: "midx::config", "No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!(target: "midx::config", "Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!(target: "midx::config", "Failed to parse config file {:?}: {}", path, e);
                tracing::warn!(target: "midx::config", "Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!(target: "midx::config", "Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`, creating its directory if needed.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!(target: "midx::config", "Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
