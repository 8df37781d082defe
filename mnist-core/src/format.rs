//! IDX binary layout
//!
//! An IDX file is a big-endian header of u32 fields followed by the raw
//! unsigned byte payload. Image files (`idx3`) carry magic, count, rows and
//! cols; label files (`idx1`) carry magic and count.

use bytes::Buf;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MnistError, Result};

/// Magic number of an `idx3-ubyte` image file
pub const IMAGE_MAGIC: u32 = 2051;

/// Magic number of an `idx1-ubyte` label file
pub const LABEL_MAGIC: u32 = 2049;

/// Image header length in bytes
pub const IMAGE_HEADER_LEN: usize = 16;

/// Label header length in bytes
pub const LABEL_HEADER_LEN: usize = 8;

/// How to treat a payload whose length disagrees with its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Payload must match the declared shape exactly
    #[default]
    Strict,
    /// Short payloads yield truncated or empty trailing records
    Lenient,
}

impl std::str::FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ParseMode::Strict),
            "lenient" => Ok(ParseMode::Lenient),
            other => Err(format!("unknown parse mode: {}", other)),
        }
    }
}

/// Parsed image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImages {
    pub magic_number: u32,
    pub num_images: u32,
    pub num_rows: u32,
    pub num_cols: u32,
    /// One row-major pixel vector per image
    pub images: Vec<Vec<u8>>,
}

/// Parsed label file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxLabels {
    pub magic_number: u32,
    pub num_labels: u32,
    pub labels: Vec<u8>,
}

/// Read an image file with strict length validation
pub fn read_images(content: &[u8]) -> Result<IdxImages> {
    parse_images("images", content, ParseMode::Strict)
}

/// Read a label file with strict length validation
pub fn read_labels(content: &[u8]) -> Result<IdxLabels> {
    parse_labels("labels", content, ParseMode::Strict)
}

/// Parse an image file
///
/// `archive` labels errors. A header shorter than 16 bytes fails in both modes.
pub fn parse_images(archive: &str, content: &[u8], mode: ParseMode) -> Result<IdxImages> {
    if content.len() < IMAGE_HEADER_LEN {
        return Err(MnistError::format(
            archive,
            format!(
                "image header needs {} bytes, got {}",
                IMAGE_HEADER_LEN,
                content.len()
            ),
        ));
    }

    let mut header = &content[..IMAGE_HEADER_LEN];
    let magic_number = header.get_u32();
    let num_images = header.get_u32();
    let num_rows = header.get_u32();
    let num_cols = header.get_u32();

    if magic_number != IMAGE_MAGIC {
        warn!(
            "{}: unexpected image magic {} (expected {})",
            archive, magic_number, IMAGE_MAGIC
        );
    }

    let image_len = (num_rows as usize)
        .checked_mul(num_cols as usize)
        .ok_or_else(|| MnistError::format(archive, "rows * cols overflows"))?;
    let payload = &content[IMAGE_HEADER_LEN..];

    if mode == ParseMode::Strict {
        if image_len == 0 && num_images > 0 {
            return Err(MnistError::format(
                archive,
                format!(
                    "header declares {} images of {}x{} which carry no pixels",
                    num_images, num_rows, num_cols
                ),
            ));
        }
        let expected = image_len
            .checked_mul(num_images as usize)
            .ok_or_else(|| MnistError::format(archive, "declared image payload overflows"))?;
        if payload.len() != expected {
            return Err(MnistError::format(
                archive,
                format!(
                    "header declares {} images of {}x{} ({} bytes) but payload has {} bytes",
                    num_images,
                    num_rows,
                    num_cols,
                    expected,
                    payload.len()
                ),
            ));
        }
    }

    // Never more records than the payload reaches, whatever the header says
    let reachable = if image_len == 0 {
        0
    } else {
        payload.len().div_ceil(image_len)
    };
    let record_count = (num_images as usize).min(reachable);
    if record_count < num_images as usize {
        warn!(
            "{}: header declares {} images but payload holds {}",
            archive, num_images, record_count
        );
    }

    let images: Vec<Vec<u8>> = payload
        .chunks(image_len.max(1))
        .take(record_count)
        .map(<[u8]>::to_vec)
        .collect();

    debug!(
        "Parsed {}: {} images of {}x{}",
        archive,
        images.len(),
        num_rows,
        num_cols
    );

    Ok(IdxImages {
        magic_number,
        num_images,
        num_rows,
        num_cols,
        images,
    })
}

/// Parse a label file
pub fn parse_labels(archive: &str, content: &[u8], mode: ParseMode) -> Result<IdxLabels> {
    if content.len() < LABEL_HEADER_LEN {
        return Err(MnistError::format(
            archive,
            format!(
                "label header needs {} bytes, got {}",
                LABEL_HEADER_LEN,
                content.len()
            ),
        ));
    }

    let mut header = &content[..LABEL_HEADER_LEN];
    let magic_number = header.get_u32();
    let num_labels = header.get_u32();

    if magic_number != LABEL_MAGIC {
        warn!(
            "{}: unexpected label magic {} (expected {})",
            archive, magic_number, LABEL_MAGIC
        );
    }

    let payload = &content[LABEL_HEADER_LEN..];
    if mode == ParseMode::Strict && payload.len() != num_labels as usize {
        return Err(MnistError::format(
            archive,
            format!(
                "header declares {} labels but payload has {} bytes",
                num_labels,
                payload.len()
            ),
        ));
    }

    debug!("Parsed {}: {} labels", archive, payload.len());

    Ok(IdxLabels {
        magic_number,
        num_labels,
        labels: payload.to_vec(),
    })
}
