//! Dataset index error types

use crate::cache::CacheError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or loading a dataset index
#[derive(Error, Debug)]
pub enum DatasetError {
    /// A root directory does not exist
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    /// A root path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed at the root
    #[error("Walk error: {0}")]
    Walk(String),

    /// Filename pattern could not be built
    #[error("Invalid filename pattern: {0}")]
    Pattern(String),

    /// Cache read or write failed
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<regex::Error> for DatasetError {
    fn from(err: regex::Error) -> Self {
        DatasetError::Pattern(err.to_string())
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
