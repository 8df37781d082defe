//! Loader wiring
//!
//! Builds the archive source, cache store and fetcher from a
//! [`LoaderConfig`] and runs the dataset assembly.

use std::sync::Arc;
use tracing::debug;

use super::dataset::{load_dataset, MnistDataset};
use crate::config::{ArchiveSourceConfig, LoaderConfig};
use crate::error::Result;
use crate::fetcher::ArchiveFetcher;
use crate::format::ParseMode;
use crate::metrics::FetchStats;
use crate::storage::{ArchiveSource, CacheStore, DirSource, FsCacheStore, HttpSource};

/// Loads MNIST through a configured source and cache
pub struct MnistLoader {
    fetcher: ArchiveFetcher,
    parse_mode: ParseMode,
}

impl MnistLoader {
    /// Create a loader from explicit components
    pub fn new(
        source: Arc<dyn ArchiveSource>,
        cache: Arc<dyn CacheStore>,
        parse_mode: ParseMode,
    ) -> Self {
        Self {
            fetcher: ArchiveFetcher::new(source, cache),
            parse_mode,
        }
    }

    /// Create a loader backed by the filesystem cache described in `config`
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        let location = config.cache_location()?;
        debug!(
            "Cache directory {} (ignore marker: {})",
            location.dir.display(),
            location.ignore_marker
        );
        let cache = FsCacheStore::new(location.dir).with_ignore_marker(location.ignore_marker);

        let source: Arc<dyn ArchiveSource> = match &config.source {
            ArchiveSourceConfig::Http(http) => Arc::new(HttpSource::new(http.clone())?),
            ArchiveSourceConfig::Dir { path } => Arc::new(DirSource::new(path.clone())),
        };

        Ok(Self::new(source, Arc::new(cache), config.parse_mode))
    }

    /// Fetch, parse and pair both splits
    pub async fn load(&self) -> Result<MnistDataset> {
        load_dataset(&self.fetcher, self.parse_mode).await
    }

    pub fn fetcher(&self) -> &ArchiveFetcher {
        &self.fetcher
    }

    pub fn stats(&self) -> FetchStats {
        self.fetcher.stats()
    }
}
