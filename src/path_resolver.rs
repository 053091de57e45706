//! # Path Resolution
//!
//! Canonical comparison of two paths, used by
//! [`move_file`](crate::move_file) to detect a move onto itself.
//!
//! ## Responsibility
//! - Resolve symlinks, `.` and `..` through the operating system
//! - Tolerate a final component that does not exist yet (move destinations)

use std::io;
use std::path::{Path, PathBuf};

use crate::FsError;

/// Resolve `path` to canonical form; every component must exist.
///
/// # Errors
///
/// - [`FsError::NotFound`] - A component doesn't exist
pub async fn canonicalize(path: &Path) -> Result<PathBuf, FsError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| FsError::io("canonicalize", path, e))
}

/// Like [`canonicalize`], but allows a non-existent final component.
///
/// The parent is resolved fully and the final component appended lexically.
/// A bare file name resolves against the current directory.
///
/// # Errors
///
/// - [`FsError::NotFound`] - The parent directory doesn't exist
pub async fn soft_canonicalize(path: &Path) -> Result<PathBuf, FsError> {
    match tokio::fs::canonicalize(path).await {
        Ok(resolved) => return Ok(resolved),
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(FsError::io("canonicalize", path, e));
        }
        Err(_) => {}
    }

    let Some(name) = path.file_name() else {
        return Err(FsError::NotFound {
            path: path.to_path_buf(),
        });
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(canonicalize(parent).await?.join(name))
}

/// Returns `true` when both paths resolve to the same location.
///
/// `from` must exist; `to` may not exist yet.
///
/// # Errors
///
/// - [`FsError::NotFound`] if `from` or the parent of `to` does not exist
pub async fn same_location(from: &Path, to: &Path) -> Result<bool, FsError> {
    let from = canonicalize(from).await?;
    let to = soft_canonicalize(to).await?;
    Ok(from == to)
}
