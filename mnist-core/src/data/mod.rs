//! Dataset assembly and loading

pub mod dataset;
pub mod loader;

pub use dataset::{archive_name, load_dataset, ArchiveKind, MnistDataset, Sample, Split};
pub use loader::MnistLoader;
