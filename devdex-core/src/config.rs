//! Runtime configuration
//!
//! Resolution order, later wins:
//! 1. Built-in defaults (platform data directory, public index, 30 s timeout)
//! 2. YAML file, `<config_dir>/config.yaml` unless a path is given
//! 3. `DEVDEX_DATA_DIR` / `DEVDEX_INDEX_URL` environment variables
//!
//! CLI flags are applied by the binary on top of the loaded value.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

use crate::catalog::DEFAULT_INDEX_URL;
use crate::error::ConfigError;

pub const DATA_DIR_ENV: &str = "DEVDEX_DATA_DIR";
pub const INDEX_URL_ENV: &str = "DEVDEX_INDEX_URL";

const CONFIG_FILE_NAME: &str = "config.yaml";
const OVERLAY_DIR_NAME: &str = "docs";
const STORE_FILE_NAME: &str = "store.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// On-disk shape; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    index_url: Option<String>,
    http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevdexConfig {
    /// Root for installed packs and the key-value store
    pub data_dir: PathBuf,
    pub index_url: String,
    pub http_timeout_secs: u64,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "devdex", "devdex")
}

impl DevdexConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Defaults rooted at the platform data directory
    pub fn defaults() -> Result<Self, ConfigError> {
        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        Ok(Self::with_data_dir(dirs.data_dir()))
    }

    /// `<config_dir>/config.yaml` for this platform
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load defaults, then the config file, then the environment
    ///
    /// An explicit `path` must exist. The default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;

        match path {
            Some(path) => config.merge_file(path)?,
            None => {
                if let Some(default_path) = Self::default_config_path() {
                    if default_path.is_file() {
                        config.merge_file(&default_path)?;
                    } else {
                        trace!("No config file at {}", default_path.display());
                    }
                }
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Overlay the values present in a YAML file
    ///
    /// A relative `data_dir` is resolved against the file's directory.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty document deserializes as unit, not as a mapping
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        if let Some(data_dir) = file.data_dir {
            self.data_dir = match path.parent() {
                Some(base) if data_dir.is_relative() => base.join(data_dir),
                _ => data_dir,
            };
        }
        if let Some(index_url) = file.index_url {
            self.index_url = index_url;
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http_timeout_secs = secs;
        }

        debug!("Loaded config from {}", path.display());
        Ok(())
    }

    /// Apply `DEVDEX_*` variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty(DATA_DIR_ENV) {
            debug!("{} overrides data directory", DATA_DIR_ENV);
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_empty(INDEX_URL_ENV) {
            debug!("{} overrides index URL", INDEX_URL_ENV);
            self.index_url = url;
        }
    }

    /// Directory holding installed pack files
    pub fn overlay_dir(&self) -> PathBuf {
        self.data_dir.join(OVERLAY_DIR_NAME)
    }

    /// JSON file backing the key-value store
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
