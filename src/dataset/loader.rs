//! Cached index loading
//!
//! The first load for a cache path walks and classifies the training tree;
//! every later load decodes the stored index instead. Deleting the cache file
//! is the only way to pick up changes on disk.

use crate::cache;
use crate::config::{CacheConfig, DatasetConfig};
use crate::dataset::error::DatasetResult;
use crate::dataset::index::DatasetIndex;
use std::path::Path;

/// Extensions recognized when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".png"];

/// Load the index for the given roots, building and caching it on first use
pub fn load_index(
    train_dir: impl AsRef<Path>,
    test_dir: impl AsRef<Path>,
    cache_path: impl AsRef<Path>,
) -> DatasetResult<DatasetIndex> {
    load_cached(
        train_dir.as_ref(),
        test_dir.as_ref(),
        DEFAULT_EXTENSIONS,
        cache_path.as_ref(),
    )
}

/// Load the index described by a dataset and cache configuration
pub fn load_index_with(dataset: &DatasetConfig, cache: &CacheConfig) -> DatasetResult<DatasetIndex> {
    load_cached(
        &dataset.train_dir(),
        &dataset.test_dir(),
        dataset.extensions.as_slice(),
        &cache.path(),
    )
}

fn load_cached<S: AsRef<str>>(
    train_dir: &Path,
    test_dir: &Path,
    extensions: &[S],
    cache_path: &Path,
) -> DatasetResult<DatasetIndex> {
    tracing::info!(
        train_dir = %train_dir.display(),
        test_dir = %test_dir.display(),
        cache = %cache_path.display(),
        "Loading signature dataset"
    );

    let index = cache::get_or_compute(cache_path, || {
        DatasetIndex::build(train_dir, test_dir, extensions)
    })?;

    if let Ok(requested) = train_dir.canonicalize() {
        if requested != index.train_dir() {
            tracing::warn!(
                requested = %requested.display(),
                cached = %index.train_dir().display(),
                "Cached index was built from a different training directory"
            );
        }
    }

    Ok(index)
}
