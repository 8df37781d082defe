//! Dataset inspection binary
//!
//! Loads MNIST using `MNIST_*` environment configuration and renders one
//! training digit. `MNIST_SAMPLE` picks the index (default 0).

use mnist_core::display::{downscale_image, print_digit};
use mnist_core::{LoaderConfig, MnistLoader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = LoaderConfig::from_env()?;
    let index: usize = std::env::var("MNIST_SAMPLE")
        .ok()
        .map(|v| v.parse::<usize>())
        .transpose()?
        .unwrap_or(0);

    let loader = MnistLoader::from_config(&config)?;
    let dataset = match loader.load().await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Loading failed at {} stage: {}", e.stage(), e);
            return Err(e.into());
        }
    };

    let stats = loader.stats();
    info!(
        "train={} test={} (cache hits {}, fetched {})",
        dataset.train.len(),
        dataset.test.len(),
        stats.cache_hits,
        stats.source_fetches
    );
    debug!("Fetch metrics:\n{}", loader.fetcher().metrics().export());

    let Some(sample) = dataset.train.get(index) else {
        error!("Sample {} out of range (train has {})", index, dataset.train.len());
        return Ok(());
    };

    let (rows, cols) = dataset.image_shape();
    let rendered = if (rows, cols) == (28, 28) {
        print_digit(&downscale_image(&sample.image)?)?
    } else {
        print_digit(&sample.image)?
    };

    println!("label {}\n{}", sample.label, rendered);
    Ok(())
}
