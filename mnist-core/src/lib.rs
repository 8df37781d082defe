//! MNIST Core - fetch, cache and parse the MNIST handwritten digit archives
//!
//! This crate provides:
//! - Cache-or-fetch access to the four gzip archives
//! - IDX binary parsing into pixel and label arrays
//! - Concurrent assembly of the train and test splits
//! - Small helpers for rendering and preprocessing images
//!
//! ```no_run
//! # async fn run() -> mnist_core::Result<()> {
//! let dataset = mnist_core::load_mnist(&mnist_core::LoaderConfig::default()).await?;
//! println!("{}", mnist_core::display::print_digit(&dataset.train[0].image)?);
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod metrics;
pub mod runtime;
pub mod storage;

pub use config::{ArchiveSourceConfig, LoaderConfig};
pub use data::{MnistDataset, MnistLoader, Sample, Split};
pub use error::{MnistError, Result, Stage};
pub use fetcher::ArchiveFetcher;
pub use format::{read_images, read_labels, IdxImages, IdxLabels, ParseMode};
pub use runtime::load_mnist_blocking;

/// Number of samples in the reference train split
pub const TRAIN_SAMPLES: usize = 60_000;

/// Number of samples in the reference test split
pub const TEST_SAMPLES: usize = 10_000;

/// Load both splits as described by `config`
pub async fn load_mnist(config: &LoaderConfig) -> Result<MnistDataset> {
    MnistLoader::from_config(config)?.load().await
}
