//! Archive sources and the local cache
//!
//! [`ArchiveSource`] yields compressed archives; [`CacheStore`] holds the
//! decompressed bytes between runs.

pub mod cache;
pub mod dir;
pub mod http;

pub use cache::{FsCacheStore, MemoryCacheStore};
pub use dir::DirSource;
pub use http::{HttpSource, HttpSourceConfig};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Where compressed archives come from
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Fetch the compressed bytes of `name`, e.g. `train-images-idx3-ubyte.gz`
    async fn fetch(&self, name: &str) -> Result<Bytes>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// Key/value store for decompressed archives
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether `key` is present. Only absence maps to `false`; every other
    /// failure is returned.
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn read(&self, key: &str) -> Result<Bytes>;

    /// Store `data` under `key`, replacing any previous entry
    async fn write(&self, key: &str, data: Bytes) -> Result<()>;

    /// Store `data` under `key` unless an entry already exists.
    ///
    /// Returns `true` if this call created the entry. Concurrent callers
    /// never observe a partially written entry.
    async fn create_if_absent(&self, key: &str, data: Bytes) -> Result<bool>;
}
