//! Cache error types

use thiserror::Error;

/// Errors that can occur while reading or writing a cache file
#[derive(Error, Debug)]
pub enum CacheError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Compression or decompression failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Cache file is damaged (bad magic, checksum mismatch, truncation, etc.)
    #[error("Corrupt cache file: {0}")]
    Corruption(String),
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
