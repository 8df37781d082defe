//! Gzip support for archive payloads
//!
//! The archives ship as a single gzip member wrapping the raw IDX bytes.

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{MnistError, Result};

/// Gzip member magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression level
#[derive(Debug, Clone, Copy)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    /// Fast compression (lower ratio)
    pub const FAST: Self = Self(1);
    /// Default compression
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slower)
    pub const BEST: Self = Self(9);

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Returns true if `data` starts with a gzip header
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..2] == GZIP_MAGIC
}

/// Gunzip an archive fully into memory
///
/// `archive` is only used to label errors.
pub fn decompress(archive: &str, data: &[u8]) -> Result<Bytes> {
    if !is_gzip(data) {
        return Err(MnistError::Decompression {
            archive: archive.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "missing gzip header",
            ),
        });
    }

    let mut decoder = GzDecoder::new(data);
    let mut output = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut output)
        .map_err(|source| MnistError::Decompression {
            archive: archive.to_string(),
            source,
        })?;

    Ok(Bytes::from(output))
}

/// Gzip `data` at the given level
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.value()));
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map(Bytes::from)
        .map_err(|e| MnistError::Internal {
            message: format!("gzip encode failed: {}", e),
        })
}

/// Calculate compression ratio
pub fn compression_ratio(original: usize, compressed: usize) -> f64 {
    if compressed == 0 {
        return 0.0;
    }
    original as f64 / compressed as f64
}
