//! HTTP archive origin
//!
//! Plain GETs against `<base_url>/<name>`. No retries: a failed request
//! surfaces to the caller.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::ArchiveSource;
use crate::error::{MnistError, Result};

/// Default mirror of the MNIST archives
pub const DEFAULT_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist";

/// Configuration for the HTTP source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Base URL the archive names are appended to
    pub base_url: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

/// Archive source backed by an HTTP(S) origin
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| MnistError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Build URL for an archive
    pub fn archive_url(&self, name: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl ArchiveSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<Bytes> {
        let url = self.archive_url(name);
        let network_error = |message: String| MnistError::Network {
            archive: name.to_string(),
            url: url.clone(),
            message,
        };

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(MnistError::NotFound {
                archive: name.to_string(),
            });
        }

        if !resp.status().is_success() {
            return Err(network_error(format!("status {}", resp.status())));
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| network_error(format!("failed to read body: {}", e)))?;

        debug!("Downloaded {} ({} bytes)", url, data.len());
        Ok(data)
    }

    fn location(&self) -> String {
        self.config.base_url.clone()
    }
}
