//! Directory traversal
//!
//! Collects every file below a root whose name ends with a recognized
//! extension. Results are sorted so an index built from them does not
//! depend on the filesystem's enumeration order.

use crate::dataset::error::{DatasetError, DatasetResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check that `root` exists and is a directory
pub fn ensure_dir(root: &Path) -> DatasetResult<()> {
    if !root.exists() {
        return Err(DatasetError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DatasetError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Recursively list files under `root` matching one of `extensions`.
///
/// `extensions` are compared against the lowercased file name, so they are
/// expected to be lowercase already. Unreadable entries below the root are
/// skipped with a warning.
pub fn find_files<S: AsRef<str>>(root: &Path, extensions: &[S]) -> DatasetResult<Vec<PathBuf>> {
    ensure_dir(root)?;

    let mut files = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(DatasetError::Walk(e.to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                skipped += 1;
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if extensions.iter().any(|ext| name.ends_with(ext.as_ref())) {
            files.push(entry.into_path());
        }
    }

    files.sort();

    tracing::debug!(
        root = %root.display(),
        files = files.len(),
        skipped,
        "Directory walk complete"
    );

    Ok(files)
}
