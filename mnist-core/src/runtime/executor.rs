//! Tokio runtime for blocking callers
//!
//! The loader is async. Callers without a runtime of their own can use
//! [`LoaderRuntime`] to drive it to completion.

use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::config::LoaderConfig;
use crate::data::{MnistDataset, MnistLoader};
use crate::error::{MnistError, Result};

/// Scheduler flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeFlavor {
    /// All four fetches multiplexed on the calling thread
    #[default]
    CurrentThread,
    /// Worker pool; decompression and I/O can overlap across cores
    MultiThread,
}

/// Configuration for the loader runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flavor: RuntimeFlavor,
    /// Worker threads for [`RuntimeFlavor::MultiThread`]
    pub worker_threads: usize,
    /// Blocking-pool threads used for decompression
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let cpus = num_cpus::get();
        Self {
            flavor: RuntimeFlavor::default(),
            worker_threads: cpus.min(4),
            max_blocking_threads: cpus.max(4),
        }
    }
}

/// Owns a Tokio runtime for driving loads from synchronous code
pub struct LoaderRuntime {
    runtime: Runtime,
}

impl LoaderRuntime {
    /// Create a new runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let mut builder = match config.flavor {
            RuntimeFlavor::CurrentThread => Builder::new_current_thread(),
            RuntimeFlavor::MultiThread => {
                let mut builder = Builder::new_multi_thread();
                builder.worker_threads(config.worker_threads.max(1));
                builder
            }
        };

        let runtime = builder
            .max_blocking_threads(config.max_blocking_threads.max(1))
            .thread_name("mnist-loader")
            .enable_all()
            .build()
            .map_err(|e| MnistError::Internal {
                message: format!("Failed to create runtime: {}", e),
            })?;

        Ok(Self { runtime })
    }

    /// Run a future to completion on this runtime
    ///
    /// Panics when called from within an async context, as Tokio does.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Build a loader from `config` and load both splits
    pub fn load_mnist(&self, config: &LoaderConfig) -> Result<MnistDataset> {
        let loader = MnistLoader::from_config(config)?;
        self.block_on(loader.load())
    }
}

/// Load MNIST on a fresh current-thread runtime
///
/// Fails with [`MnistError::InvalidConfig`] when called from within a Tokio
/// runtime; await [`load_mnist`](crate::load_mnist) there instead.
pub fn load_mnist_blocking(config: &LoaderConfig) -> Result<MnistDataset> {
    if Handle::try_current().is_ok() {
        return Err(MnistError::InvalidConfig {
            reason: "load_mnist_blocking called from inside a Tokio runtime".into(),
        });
    }
    LoaderRuntime::new(RuntimeConfig::default())?.load_mnist(config)
}
