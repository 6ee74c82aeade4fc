//! # SigComp
//!
//! Acquisition and indexing for the ICDAR SigComp 2011 signature
//! verification dataset.
//!
//! ## Features
//!
//! - **Acquisition**: downloads and unpacks the password-protected train/test archives
//! - **Classification**: recovers author and genuine/forgery labels from file names
//! - **Caching**: persists the index so repeated loads skip the directory walk
//!
//! ## Modules
//!
//! - [`acquire`]: archive download and extraction
//! - [`dataset`]: filename classifier, directory walker and index
//! - [`cache`]: generic memoizing disk cache
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigcomp::{ensure_data_available, load_index, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     ensure_data_available(&config.acquisition, &config.dataset)?;
//!
//!     let index = load_index(
//!         config.dataset.train_dir(),
//!         config.dataset.test_dir(),
//!         config.cache.path(),
//!     )?;
//!
//!     println!("{} authors, {} classes", index.num_authors(), index.num_classes());
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod cache;
pub mod config;
pub mod dataset;

// Re-export top-level types for convenience
pub use acquire::{ensure_data_available, AcquireError, AcquireResult, ArchiveSource};

pub use cache::{get_or_compute, CacheError, CacheFile, CacheResult};

pub use dataset::{
    load_index, load_index_with, AuthorEntry, Classification, DatasetError, DatasetIndex,
    DatasetResult, FilenameClassifier, IndexSummary, SignatureKind, SignatureRecord,
};

pub use config::{
    AcquisitionConfig, ArchiveConfig, CacheConfig, Config, ConfigError, DatasetConfig,
    LoggingConfig, Split,
};
