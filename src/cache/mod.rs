//! Memoizing disk cache
//!
//! Stores a single serialized value per key, where the key is the path of the
//! cache file itself. The first call for a key computes and persists the
//! value; every later call decodes it from disk without running the builder.
//!
//! # Example
//!
//! ```rust,no_run
//! use sigcomp::cache::{get_or_compute, CacheError};
//!
//! let squares: Vec<u64> = get_or_compute("squares.cache", || {
//!     Ok::<_, CacheError>((0..10).map(|i| i * i).collect())
//! })?;
//! # Ok::<(), CacheError>(())
//! ```
//!
//! Entries are never invalidated automatically. A stale value is refreshed
//! only by deleting the file (see [`CacheFile::invalidate`]).

pub mod error;
pub mod file;

pub use error::{CacheError, CacheResult};
pub use file::{CacheFile, CacheHeader};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Return the value cached at `key`, or build, persist and return it.
///
/// The builder runs at most once per key as long as the file stays in place.
/// Its error type absorbs cache failures, so callers see a single error type.
/// A damaged cache file is reported, never silently rebuilt.
pub fn get_or_compute<T, E, F>(key: impl AsRef<Path>, build: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>,
    E: From<CacheError>,
{
    let file = CacheFile::new(key.as_ref());

    if let Some(value) = file.load()? {
        tracing::debug!(path = %file.path().display(), "Cache hit");
        return Ok(value);
    }

    tracing::info!(path = %file.path().display(), "Cache miss, building value");
    let value = build()?;
    file.store(&value)?;

    Ok(value)
}
