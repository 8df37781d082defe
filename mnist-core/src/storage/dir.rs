//! Archives bundled in a local directory

use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::ArchiveSource;
use crate::error::{MnistError, Result, Stage};

/// Reads compressed archives from a directory of `.gz` files
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArchiveSource for DirSource {
    async fn fetch(&self, name: &str) -> Result<Bytes> {
        let path = self.root.join(name);
        debug!("Reading {}", path.display());

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MnistError::NotFound {
                archive: name.to_string(),
            }),
            Err(e) => Err(MnistError::io(name, Stage::Fetch, e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
