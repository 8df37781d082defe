//! Cache-or-fetch access to decompressed archives

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use crate::compression::{compression_ratio, decompress};
use crate::error::{MnistError, Result};
use crate::metrics::{FetchMetrics, FetchStats};
use crate::storage::{ArchiveSource, CacheStore};

/// Suffix of the compressed archive names
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Returns decompressed archive bytes, fetching and caching on first use
pub struct ArchiveFetcher {
    source: Arc<dyn ArchiveSource>,
    cache: Arc<dyn CacheStore>,
    metrics: FetchMetrics,
}

impl ArchiveFetcher {
    pub fn new(source: Arc<dyn ArchiveSource>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            cache,
            metrics: FetchMetrics::new(),
        }
    }

    /// Decompressed contents of `filename`, e.g. `train-images-idx3-ubyte`.
    ///
    /// Served from the cache when present. Otherwise `<filename>.gz` is read
    /// from the source, gunzipped, and stored before returning.
    pub async fn get_content(&self, filename: &str) -> Result<Bytes> {
        if self.cache.exists(filename).await? {
            self.metrics.cache_hits.inc();
            debug!("Cache hit for {}", filename);
            return self.cache.read(filename).await;
        }
        self.metrics.cache_misses.inc();

        let compressed_name = format!("{}{}", filename, COMPRESSED_SUFFIX);
        info!("Fetching {} from {}", compressed_name, self.source.location());
        let compressed = self.source.fetch(&compressed_name).await?;
        self.metrics.source_fetches.inc();
        self.metrics.bytes_compressed.inc_by(compressed.len() as u64);

        let compressed_len = compressed.len();
        let archive = filename.to_string();
        let data = tokio::task::spawn_blocking(move || decompress(&archive, &compressed))
            .await
            .map_err(|e| MnistError::Internal {
                message: format!("decompression task for {} failed: {}", filename, e),
            })??;
        self.metrics.decompressions.inc();
        self.metrics.bytes_decompressed.inc_by(data.len() as u64);

        debug!(
            "Decompressed {}: {} -> {} bytes (ratio {:.2})",
            filename,
            compressed_len,
            data.len(),
            compression_ratio(data.len(), compressed_len)
        );

        if !self.cache.create_if_absent(filename, data.clone()).await? {
            debug!("{} already cached by another loader", filename);
        }

        Ok(data)
    }

    /// Counters since this fetcher was created
    pub fn stats(&self) -> FetchStats {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &FetchMetrics {
        &self.metrics
    }
}
