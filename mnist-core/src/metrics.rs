//! Fetch counters
//!
//! Tracks how often the fetcher served from cache versus going back to the
//! archive source. Rendered in Prometheus text format for ad-hoc inspection.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter metric (monotonically increasing)
pub struct Counter {
    value: AtomicU64,
    name: &'static str,
    help: &'static str,
}

impl Counter {
    /// Create a new counter
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name,
            help,
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by delta
    pub fn inc_by(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Point-in-time copy of [`FetchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub source_fetches: u64,
    pub decompressions: u64,
    pub bytes_compressed: u64,
    pub bytes_decompressed: u64,
}

/// Counters owned by one [`ArchiveFetcher`](crate::fetcher::ArchiveFetcher)
pub struct FetchMetrics {
    pub cache_hits: Counter,
    pub cache_misses: Counter,
    pub source_fetches: Counter,
    pub decompressions: Counter,
    pub bytes_compressed: Counter,
    pub bytes_decompressed: Counter,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self {
            cache_hits: Counter::new("mnist_cache_hits_total", "Archives served from cache"),
            cache_misses: Counter::new("mnist_cache_misses_total", "Archives not found in cache"),
            source_fetches: Counter::new(
                "mnist_source_fetches_total",
                "Compressed archives read from the source",
            ),
            decompressions: Counter::new("mnist_decompressions_total", "Archives gunzipped"),
            bytes_compressed: Counter::new(
                "mnist_compressed_bytes_total",
                "Compressed bytes read from the source",
            ),
            bytes_decompressed: Counter::new(
                "mnist_decompressed_bytes_total",
                "Bytes produced by decompression",
            ),
        }
    }

    pub fn snapshot(&self) -> FetchStats {
        FetchStats {
            cache_hits: self.cache_hits.get(),
            cache_misses: self.cache_misses.get(),
            source_fetches: self.source_fetches.get(),
            decompressions: self.decompressions.get(),
            bytes_compressed: self.bytes_compressed.get(),
            bytes_decompressed: self.bytes_decompressed.get(),
        }
    }

    /// Export all counters in Prometheus format
    pub fn export(&self) -> String {
        [
            &self.cache_hits,
            &self.cache_misses,
            &self.source_fetches,
            &self.decompressions,
            &self.bytes_compressed,
            &self.bytes_decompressed,
        ]
        .iter()
        .map(|c| c.to_prometheus())
        .collect()
    }
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
