//! Synthetic archive fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use mnist_core::compression::{compress, CompressionLevel};
use mnist_core::data::{archive_name, ArchiveKind, Split};
use mnist_core::format::{IMAGE_MAGIC, LABEL_MAGIC};
use mnist_core::storage::ArchiveSource;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const ROWS: u32 = 2;
pub const COLS: u32 = 2;
pub const TRAIN_COUNT: u32 = 3;
pub const TEST_COUNT: u32 = 2;

pub fn image_file(count: u32, rows: u32, cols: u32, fill: impl Fn(usize) -> u8) -> Vec<u8> {
    let mut out = Vec::new();
    for field in [IMAGE_MAGIC, count, rows, cols] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend((0..(count * rows * cols) as usize).map(fill));
    out
}

pub fn label_file(labels: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    out.extend_from_slice(labels);
    out
}

/// Raw (decompressed) contents for all four archives
pub fn raw_archives() -> Vec<(String, Vec<u8>)> {
    vec![
        (
            archive_name(Split::Train, ArchiveKind::Images),
            image_file(TRAIN_COUNT, ROWS, COLS, |i| i as u8),
        ),
        (
            archive_name(Split::Train, ArchiveKind::Labels),
            label_file(&[5, 0, 4]),
        ),
        (
            archive_name(Split::Test, ArchiveKind::Images),
            image_file(TEST_COUNT, ROWS, COLS, |i| 100 + i as u8),
        ),
        (
            archive_name(Split::Test, ArchiveKind::Labels),
            label_file(&[7, 2]),
        ),
    ]
}

/// Write gzipped archives into `dir`, applying `edit` to each raw payload first
pub fn write_archives_with(dir: &Path, edit: impl Fn(&str, Vec<u8>) -> Vec<u8>) {
    for (name, raw) in raw_archives() {
        let raw = edit(&name, raw);
        let gz = compress(&raw, CompressionLevel::DEFAULT).unwrap();
        std::fs::write(dir.join(format!("{}.gz", name)), &gz).unwrap();
    }
}

pub fn write_archives(dir: &Path) {
    write_archives_with(dir, |_, raw| raw);
}

/// Source wrapper counting how often archives are fetched
pub struct CountingSource<S> {
    inner: S,
    fetches: AtomicU64,
}

impl<S: ArchiveSource> CountingSource<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fetches: AtomicU64::new(0),
        })
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: ArchiveSource> ArchiveSource for CountingSource<S> {
    async fn fetch(&self, name: &str) -> mnist_core::Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(name).await
    }

    fn location(&self) -> String {
        self.inner.location()
    }
}
