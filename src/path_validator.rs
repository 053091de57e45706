//! Syntactic path guard run before any I/O.

use std::path::Path;

use crate::FsError;

/// Characters the host platform never accepts inside a path.
#[cfg(windows)]
pub const INVALID_PATH_CHARS: &[char] = &[
    '"', '<', '>', '|', '\0', '\u{1}', '\u{2}', '\u{3}', '\u{4}', '\u{5}', '\u{6}', '\u{7}',
    '\u{8}', '\t', '\n', '\u{b}', '\u{c}', '\r', '\u{e}', '\u{f}', '\u{10}', '\u{11}', '\u{12}',
    '\u{13}', '\u{14}', '\u{15}', '\u{16}', '\u{17}', '\u{18}', '\u{19}', '\u{1a}', '\u{1b}',
    '\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}',
];

/// Characters the host platform never accepts inside a path.
#[cfg(not(windows))]
pub const INVALID_PATH_CHARS: &[char] = &['\0'];

/// Reject paths that are structurally unusable.
///
/// Fails with [`FsError::InvalidArgument`] when `path` is empty, consists only
/// of whitespace, or contains a character from [`INVALID_PATH_CHARS`].
///
/// Existence, permissions and reachability are not checked here; those
/// surface later as native I/O failures.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if the path is malformed
///
/// # Example
///
/// ```rust
/// use async_file_ops::{validate_path, FsError};
///
/// assert!(validate_path("/tmp/report.txt").is_ok());
/// assert!(matches!(validate_path("   "), Err(FsError::InvalidArgument { .. })));
/// ```
pub fn validate_path(path: impl AsRef<Path>) -> Result<(), FsError> {
    let text = path.as_ref().as_os_str().to_string_lossy();

    if text.trim().is_empty() {
        return Err(FsError::invalid_argument(
            "path",
            "is a zero-length string or contains only white space",
        ));
    }

    if let Some(c) = text.chars().find(|c| INVALID_PATH_CHARS.contains(c)) {
        return Err(FsError::invalid_argument(
            "path",
            format!("contains invalid character {c:?}"),
        ));
    }

    Ok(())
}
