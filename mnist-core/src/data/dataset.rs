//! Dataset assembly
//!
//! Fetches the four archives concurrently, parses them, and pairs each
//! image with the label at the same index.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MnistError, Result};
use crate::fetcher::ArchiveFetcher;
use crate::format::{parse_images, parse_labels, IdxImages, IdxLabels, ParseMode};

/// One of the two logical partitions of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    /// Filename prefix used by the archives
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "t10k",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
            Split::Test => f.write_str("test"),
        }
    }
}

/// Contents of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Images,
    Labels,
}

impl ArchiveKind {
    fn file_part(&self) -> &'static str {
        match self {
            ArchiveKind::Images => "images-idx3",
            ArchiveKind::Labels => "labels-idx1",
        }
    }
}

/// Canonical decompressed filename, e.g. `t10k-labels-idx1-ubyte`
pub fn archive_name(split: Split, kind: ArchiveKind) -> String {
    format!("{}-{}-ubyte", split.file_prefix(), kind.file_part())
}

/// An image paired with its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Row-major pixels, 0..=255
    pub image: Vec<u8>,
    pub label: u8,
}

/// Both splits of the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnistDataset {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
    /// (rows, cols) declared by the train image header
    pub image_shape: (u32, u32),
}

impl MnistDataset {
    pub fn train(&self) -> &[Sample] {
        &self.train
    }

    pub fn test(&self) -> &[Sample] {
        &self.test
    }

    pub fn split(&self, split: Split) -> &[Sample] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    pub fn image_shape(&self) -> (u32, u32) {
        self.image_shape
    }
}

async fn fetch_images(fetcher: &ArchiveFetcher, split: Split, mode: ParseMode) -> Result<IdxImages> {
    let name = archive_name(split, ArchiveKind::Images);
    let content = fetcher.get_content(&name).await?;
    parse_images(&name, &content, mode)
}

async fn fetch_labels(fetcher: &ArchiveFetcher, split: Split, mode: ParseMode) -> Result<IdxLabels> {
    let name = archive_name(split, ArchiveKind::Labels);
    let content = fetcher.get_content(&name).await?;
    parse_labels(&name, &content, mode)
}

/// Pair images and labels positionally
pub fn zip_split(split: Split, images: Vec<Vec<u8>>, labels: Vec<u8>) -> Result<Vec<Sample>> {
    if images.len() != labels.len() {
        return Err(MnistError::ShapeMismatch {
            split: split.to_string(),
            images: images.len(),
            labels: labels.len(),
        });
    }

    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(image, label)| Sample { image, label })
        .collect())
}

/// Load both splits through `fetcher`
///
/// The four archives are fetched and parsed concurrently on the calling
/// task. The first failure aborts the load and drops the other pipelines.
pub async fn load_dataset(fetcher: &ArchiveFetcher, mode: ParseMode) -> Result<MnistDataset> {
    let (train_images, train_labels, test_images, test_labels) = tokio::try_join!(
        fetch_images(fetcher, Split::Train, mode),
        fetch_labels(fetcher, Split::Train, mode),
        fetch_images(fetcher, Split::Test, mode),
        fetch_labels(fetcher, Split::Test, mode),
    )?;

    let image_shape = (train_images.num_rows, train_images.num_cols);
    if (test_images.num_rows, test_images.num_cols) != image_shape {
        warn!(
            "Test images are {}x{}, train images are {}x{}",
            test_images.num_rows, test_images.num_cols, image_shape.0, image_shape.1
        );
    }

    let train = zip_split(Split::Train, train_images.images, train_labels.labels)?;
    let test = zip_split(Split::Test, test_images.images, test_labels.labels)?;

    info!(
        "Loaded MNIST: {} train, {} test samples of {}x{}",
        train.len(),
        test.len(),
        image_shape.0,
        image_shape.1
    );

    Ok(MnistDataset {
        train,
        test,
        image_shape,
    })
}
