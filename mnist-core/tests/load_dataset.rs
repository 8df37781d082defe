//! End-to-end loading against synthetic archives
//!
//! Archives are written to a temporary directory and read through
//! `DirSource`, so no network access is needed.

mod common;

use common::*;
use mnist_core::storage::{DirSource, FsCacheStore, MemoryCacheStore};
use mnist_core::{LoaderConfig, MnistError, MnistLoader, ParseMode, Split, Stage};
use std::sync::Arc;

#[tokio::test]
async fn test_load_pairs_images_with_labels() {
    let archives = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    write_archives(archives.path());

    let config = LoaderConfig::new()
        .with_archive_dir(archives.path())
        .with_cache_dir(cache.path());
    let dataset = mnist_core::load_mnist(&config).await.unwrap();

    assert_eq!(dataset.train.len(), TRAIN_COUNT as usize);
    assert_eq!(dataset.test.len(), TEST_COUNT as usize);
    assert_eq!(dataset.image_shape(), (ROWS, COLS));

    assert_eq!(dataset.train[0].image, vec![0, 1, 2, 3]);
    assert_eq!(dataset.train[0].label, 5);
    assert_eq!(dataset.train[2].image, vec![8, 9, 10, 11]);
    assert_eq!(dataset.train[2].label, 4);

    let test = dataset.split(Split::Test);
    assert_eq!(test[1].image, vec![104, 105, 106, 107]);
    assert_eq!(test[1].label, 2);
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let archives = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    write_archives(archives.path());

    let source = CountingSource::new(DirSource::new(archives.path()));
    let cache = Arc::new(FsCacheStore::new(cache_dir.path()));

    let first = MnistLoader::new(source.clone(), cache.clone(), ParseMode::Strict);
    let a = first.load().await.unwrap();
    assert_eq!(source.fetches(), 4);
    assert_eq!(first.stats().decompressions, 4);

    // A fresh loader over the same cache must not touch the source again
    let second = MnistLoader::new(source.clone(), cache, ParseMode::Strict);
    let b = second.load().await.unwrap();
    assert_eq!(source.fetches(), 4);
    assert_eq!(second.stats().cache_hits, 4);
    assert_eq!(second.stats().decompressions, 0);

    assert_eq!(a, b);
}

#[tokio::test]
async fn test_cached_bytes_match_fresh_decompression() {
    let archives = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    write_archives(archives.path());

    let loader = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(FsCacheStore::new(cache_dir.path())),
        ParseMode::Strict,
    );
    loader.load().await.unwrap();

    for (name, raw) in raw_archives() {
        let fresh = loader.fetcher().get_content(&name).await.unwrap();
        let on_disk = std::fs::read(cache_dir.path().join(&name)).unwrap();
        assert_eq!(fresh.as_ref(), raw.as_slice());
        assert_eq!(on_disk, raw);
    }
}

#[tokio::test]
async fn test_corrupt_archive_fails_at_decompress_stage() {
    let archives = tempfile::tempdir().unwrap();
    write_archives(archives.path());
    std::fs::write(
        archives.path().join("t10k-labels-idx1-ubyte.gz"),
        b"this is not a gzip stream",
    )
    .unwrap();

    let loader = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Strict,
    );
    let err = loader.load().await.unwrap_err();

    assert_eq!(err.stage(), Stage::Decompress);
    assert_eq!(err.archive(), Some("t10k-labels-idx1-ubyte"));
}

#[tokio::test]
async fn test_missing_archive_fails_whole_load() {
    let archives = tempfile::tempdir().unwrap();
    write_archives(archives.path());
    std::fs::remove_file(archives.path().join("train-labels-idx1-ubyte.gz")).unwrap();

    let loader = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Strict,
    );

    match loader.load().await {
        Err(MnistError::NotFound { archive }) => {
            assert_eq!(archive, "train-labels-idx1-ubyte.gz")
        }
        other => panic!("expected NotFound, got {:?}", other.map(|d| d.train.len())),
    }
}

#[tokio::test]
async fn test_label_count_mismatch_is_rejected() {
    let archives = tempfile::tempdir().unwrap();
    write_archives_with(archives.path(), |name, raw| {
        if name == "train-labels-idx1-ubyte" {
            label_file(&[5, 0])
        } else {
            raw
        }
    });

    let loader = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Strict,
    );
    let err = loader.load().await.unwrap_err();

    assert!(matches!(
        err,
        MnistError::ShapeMismatch { images: 3, labels: 2, .. }
    ));
    assert_eq!(err.stage(), Stage::Assemble);
}

#[tokio::test]
async fn test_truncated_payload_strict_vs_lenient() {
    let archives = tempfile::tempdir().unwrap();
    write_archives_with(archives.path(), |name, mut raw| {
        if name == "t10k-images-idx3-ubyte" {
            raw.truncate(raw.len() - 2);
        }
        raw
    });

    let strict = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Strict,
    );
    let err = strict.load().await.unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);
    assert_eq!(err.archive(), Some("t10k-images-idx3-ubyte"));

    let lenient = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Lenient,
    );
    let dataset = lenient.load().await.unwrap();
    assert_eq!(dataset.test[1].image, vec![104, 105]);
}

#[tokio::test]
async fn test_zero_item_archives() {
    let archives = tempfile::tempdir().unwrap();
    write_archives_with(archives.path(), |name, raw| {
        if name.starts_with("t10k-images") {
            image_file(0, 28, 28, |_| 0)
        } else if name.starts_with("t10k-labels") {
            label_file(&[])
        } else {
            raw
        }
    });

    let loader = MnistLoader::new(
        Arc::new(DirSource::new(archives.path())),
        Arc::new(MemoryCacheStore::new()),
        ParseMode::Strict,
    );
    let dataset = loader.load().await.unwrap();
    assert!(dataset.test.is_empty());
    assert_eq!(dataset.train.len(), TRAIN_COUNT as usize);
}
