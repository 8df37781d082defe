//! Cache store implementations
//!
//! [`FsCacheStore`] keeps one file per archive in a cache directory.
//! [`MemoryCacheStore`] keeps them in a map and is meant for tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::CacheStore;
use crate::error::{MnistError, Result, Stage};

/// Name of the version-control ignore marker
pub const IGNORE_MARKER: &str = ".gitignore";

/// Ignore marker contents: ignore everything in the directory
pub const IGNORE_MARKER_CONTENTS: &[u8] = b"*\n";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Filesystem-backed cache, one file per key
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    dir: PathBuf,
    ignore_marker: bool,
}

impl FsCacheStore {
    /// Create a store rooted at `dir`. Nothing is created until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ignore_marker: false,
        }
    }

    /// Write an ignore marker into the directory alongside cached entries
    pub fn with_ignore_marker(mut self, enabled: bool) -> Self {
        self.ignore_marker = enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}-{}.tmp", key, std::process::id(), seq))
    }

    /// Create the directory (and parents) and the ignore marker if enabled
    async fn prepare_dir(&self, key: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MnistError::io(key, Stage::Cache, e))?;

        if self.ignore_marker {
            tokio::fs::write(self.dir.join(IGNORE_MARKER), IGNORE_MARKER_CONTENTS)
                .await
                .map_err(|e| MnistError::io(key, Stage::Cache, e))?;
        }
        Ok(())
    }

    /// Write `data` to a fresh temporary file next to the destination
    async fn stage_temp(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let tmp = self.temp_path(key);
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| MnistError::io(key, Stage::Cache, e))?;
        Ok(tmp)
    }

    /// Fallback publish for filesystems without hard links.
    ///
    /// Not atomic: another writer can land between the existence check and
    /// the rename, in which case the later rename wins. Both carry the same
    /// decompressed bytes.
    async fn publish_by_rename(&self, key: &str, tmp: &Path, dest: &Path) -> Result<bool> {
        if self.exists(key).await? {
            return Ok(false);
        }
        tokio::fs::rename(tmp, dest)
            .await
            .map_err(|e| MnistError::io(key, Stage::Cache, e))?;
        Ok(true)
    }
}

#[async_trait]
impl CacheStore for FsCacheStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        match tokio::fs::metadata(self.path_for(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MnistError::io(key, Stage::Cache, e)),
        }
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        let data = tokio::fs::read(self.path_for(key))
            .await
            .map_err(|e| MnistError::io(key, Stage::Cache, e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<()> {
        self.prepare_dir(key).await?;

        let tmp = self.stage_temp(key, &data).await?;
        let dest = self.path_for(key);
        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(MnistError::io(key, Stage::Cache, e));
        }

        debug!("Cached {} ({} bytes) at {}", key, data.len(), dest.display());
        Ok(())
    }

    async fn create_if_absent(&self, key: &str, data: Bytes) -> Result<bool> {
        self.prepare_dir(key).await?;

        // Hard-linking the staged file fails if the destination exists, so
        // readers only ever see complete entries.
        let tmp = self.stage_temp(key, &data).await?;
        let dest = self.path_for(key);
        let linked = tokio::fs::hard_link(&tmp, &dest).await;

        let outcome = match linked {
            Err(e) if links_unsupported(&e) => {
                warn!(
                    "Hard links unavailable in {} ({}), publishing {} by rename",
                    self.dir.display(),
                    e,
                    key
                );
                self.publish_by_rename(key, &tmp, &dest).await
            }
            other => other.map(|()| true).or_else(|e| match e.kind() {
                ErrorKind::AlreadyExists => Ok(false),
                _ => Err(MnistError::io(key, Stage::Cache, e)),
            }),
        };

        if tokio::fs::try_exists(&tmp).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(&tmp).await {
                warn!("Failed to remove staging file {}: {}", tmp.display(), e);
            }
        }

        match outcome {
            Ok(true) => debug!("Cached {} ({} bytes) at {}", key, data.len(), dest.display()),
            Ok(false) => debug!("{} was cached concurrently, keeping existing entry", key),
            Err(ref e) => debug!("Caching {} failed: {}", key, e),
        }
        outcome
    }
}

/// Errors some filesystems (exFAT, SMB shares) return for `link(2)`
fn links_unsupported(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::Unsupported | ErrorKind::PermissionDenied)
}

/// In-memory cache store
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Bytes>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        self.entries
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| {
                MnistError::io(key, Stage::Cache, std::io::Error::from(ErrorKind::NotFound))
            })
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<()> {
        self.entries.lock().insert(key.to_string(), data);
        Ok(())
    }

    async fn create_if_absent(&self, key: &str, data: Bytes) -> Result<bool> {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), data);
        Ok(true)
    }
}
