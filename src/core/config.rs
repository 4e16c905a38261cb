//! core::config
//!
//! Session configuration.
//!
//! # Location
//!
//! Options are loaded from (in order of precedence):
//! 1. `$MOORING_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/mooring/config.toml`
//!
//! A missing file yields the defaults; a malformed file is an error.
//!
//! # Example
//!
//! ```toml
//! allow_empty_commits = false
//! default_remote = "origin"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{RemoteName, TypeError};

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("malformed config file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// A config value failed validation.
    #[error("invalid config value: {0}")]
    InvalidValue(#[from] TypeError),
}

/// Options governing a repository session.
///
/// These settle the policy choices the facade deliberately exposes rather
/// than fixing: whether an empty staged diff may be committed, and which
/// remote to synchronize with when the caller names none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    /// Permit commits whose tree is identical to the parent's.
    /// Defaults to false: an empty staged diff is reported as
    /// `NothingToCommit`.
    pub allow_empty_commits: bool,

    /// Remote used when push/pull is invoked without an explicit remote.
    pub default_remote: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            allow_empty_commits: false,
            default_remote: "origin".to_string(),
        }
    }
}

impl SessionOptions {
    /// Load options from the default location.
    ///
    /// Returns defaults when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load options from an explicit file path.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Unreadable`] if the file cannot be read
    /// - [`ConfigError::Malformed`] if it is not valid TOML for this schema
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let options: SessionOptions =
            toml::from_str(&raw).map_err(|e| ConfigError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        options.validate()?;
        Ok(options)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        RemoteName::new(self.default_remote.clone())?;
        Ok(())
    }

    /// The validated default remote.
    ///
    /// `validate` has already run for loaded configs, so this only fails
    /// for hand-constructed options carrying a bad name.
    pub fn default_remote(&self) -> Result<RemoteName, TypeError> {
        RemoteName::new(self.default_remote.clone())
    }

    /// Resolve the config file path: `$MOORING_CONFIG`, else
    /// `<config dir>/mooring/config.toml`.
    fn config_path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var("MOORING_CONFIG") {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|dir| dir.join("mooring").join("config.toml"))
    }
}
