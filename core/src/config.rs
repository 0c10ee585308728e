//! Configuration loading.
//!
//! The config file is optional; a missing file yields `StatsConfig::default()`.
//! Extra map trigger rules from the file are appended after the built-in
//! table by [`crate::log::TriggerTable::with_extras`].

use std::fs;
use std::path::{Path, PathBuf};

use tfstats_types::StatsConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("map trigger rule #{index} has an empty trigger string")]
    EmptyTrigger { index: usize },
}

/// Load a config file.
pub fn load_config(path: &Path) -> Result<StatsConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config at `path`, or defaults if there is no file there.
pub fn load_config_or_default(path: Option<&Path>) -> Result<StatsConfig, ConfigError> {
    match path {
        Some(path) if path.exists() => load_config(path),
        Some(path) => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(StatsConfig::default())
        }
        None => Ok(StatsConfig::default()),
    }
}

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tfstats").join("config.toml"))
}
