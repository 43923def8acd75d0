//! Directory helpers for output paths.

use std::path::Path;

use crate::error::{Error, Result};

/// Whether anything exists at `path`.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Create `dir` and all missing parents. Does nothing if it already exists.
///
/// # Errors
///
/// Returns [`Error::CreateDir`] if the directory tree cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if exists(dir) {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Create the directory that will hold `file`.
///
/// # Errors
///
/// Returns [`Error::CreateDir`] if the parent directory cannot be created.
pub fn ensure_parent_dir(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
