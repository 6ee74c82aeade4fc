//! Acquisition error types

use thiserror::Error;

/// Errors that can occur while downloading or extracting archives
#[derive(Error, Debug)]
pub enum AcquireError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Archive is corrupt, encrypted with another password, or unsupported
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Archive URL has no usable file name
    #[error("Invalid archive URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for acquisition operations
pub type AcquireResult<T> = Result<T, AcquireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AcquireError::InvalidUrl("http://example.com/".to_string());
        assert_eq!(err.to_string(), "Invalid archive URL: http://example.com/");
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: AcquireError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, AcquireError::Archive(_)));
    }
}
