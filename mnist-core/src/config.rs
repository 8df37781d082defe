//! Loader configuration
//!
//! Defaults fetch over HTTP into `./.mnist_data`. [`LoaderConfig::from_env`]
//! overrides them from `MNIST_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MnistError, Result};
use crate::format::ParseMode;
use crate::storage::HttpSourceConfig;

/// Default cache directory name, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = ".mnist_data";

pub const ENV_CACHE_DIR: &str = "MNIST_CACHE_DIR";
pub const ENV_BASE_URL: &str = "MNIST_BASE_URL";
pub const ENV_ARCHIVE_DIR: &str = "MNIST_ARCHIVE_DIR";
pub const ENV_PARSE_MODE: &str = "MNIST_PARSE_MODE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MNIST_REQUEST_TIMEOUT_SECS";

/// Where compressed archives are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArchiveSourceConfig {
    /// HTTP(S) origin
    Http(HttpSourceConfig),
    /// Directory of bundled `.gz` archives
    Dir { path: PathBuf },
}

impl Default for ArchiveSourceConfig {
    fn default() -> Self {
        ArchiveSourceConfig::Http(HttpSourceConfig::default())
    }
}

/// Resolved cache location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    pub dir: PathBuf,
    /// Set when the directory is the default one, which gets an ignore marker
    pub ignore_marker: bool,
}

/// Configuration for [`MnistLoader`](crate::data::MnistLoader)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Cache directory; `None` means `./.mnist_data`
    pub cache_dir: Option<PathBuf>,
    pub source: ArchiveSourceConfig,
    pub parse_mode: ParseMode,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_source(mut self, source: ArchiveSourceConfig) -> Self {
        self.source = source;
        self
    }

    /// Read bundled archives from `path` instead of the network
    pub fn with_archive_dir(self, path: impl Into<PathBuf>) -> Self {
        self.with_source(ArchiveSourceConfig::Dir { path: path.into() })
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    /// Resolve the cache directory against the current working directory
    pub fn cache_location(&self) -> Result<CacheLocation> {
        match &self.cache_dir {
            Some(dir) => Ok(CacheLocation {
                dir: dir.clone(),
                ignore_marker: false,
            }),
            None => {
                let cwd = std::env::current_dir().map_err(|e| MnistError::InvalidConfig {
                    reason: format!("cannot resolve working directory: {}", e),
                })?;
                Ok(CacheLocation {
                    dir: cwd.join(DEFAULT_CACHE_DIR),
                    ignore_marker: true,
                })
            }
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            config.cache_dir = Some(PathBuf::from(dir));
        }

        if let Some(mode) = lookup(ENV_PARSE_MODE) {
            config.parse_mode = mode
                .parse()
                .map_err(|reason| MnistError::InvalidConfig { reason })?;
        }

        if let Some(path) = lookup(ENV_ARCHIVE_DIR) {
            config.source = ArchiveSourceConfig::Dir {
                path: PathBuf::from(path),
            };
            return Ok(config);
        }

        let mut http = HttpSourceConfig::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            http.base_url = url;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            http.request_timeout_secs = secs.parse().map_err(|_| MnistError::InvalidConfig {
                reason: format!("{} must be a number of seconds, got {:?}", ENV_REQUEST_TIMEOUT_SECS, secs),
            })?;
        }
        config.source = ArchiveSourceConfig::Http(http);

        Ok(config)
    }
}
