//! Runtime management for synchronous callers

pub mod executor;

pub use executor::{load_mnist_blocking, LoaderRuntime, RuntimeConfig, RuntimeFlavor};
