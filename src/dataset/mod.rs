//! Signature dataset index
//!
//! - **classify**: filename patterns for genuine and forged samples
//! - **walker**: recursive, sorted file discovery
//! - **index**: author → genuine/forgery mapping and class names
//! - **loader**: cache-backed loading
//! - **error**: error types
//!
//! # Flow
//!
//! ```text
//! train dir → walk → classify → DatasetIndex → cache
//!                                      ↑
//!                  later loads ────────┘ (no walk)
//! ```

pub mod classify;
pub mod error;
pub mod index;
pub mod loader;
pub mod walker;

pub use classify::{Classification, FilenameClassifier, SignatureKind};
pub use error::{DatasetError, DatasetResult};
pub use index::{AuthorEntry, DatasetIndex, IndexSummary, SignatureRecord};
pub use loader::{load_index, load_index_with, DEFAULT_EXTENSIONS};
pub use walker::find_files;
