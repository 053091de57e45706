//! Error types for async file operations.

use std::io;
use std::path::{Path, PathBuf};

/// File operation error type with contextual variants.
///
/// All error variants include relevant context (path, operation) where applicable.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use async_file_ops::FsError;
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Argument Errors
    /// An argument was rejected before any I/O took place.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    // Path/File Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    // Cancellation
    /// The caller's cancellation token was raised at a checkpoint.
    #[error("{operation}: cancelled: {path}")]
    Cancelled {
        /// The operation that observed the cancellation.
        operation: &'static str,
        /// The path being worked on.
        path: PathBuf,
    },

    // Permission/Access Errors
    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    // Data Errors
    /// Content could not be mapped through the requested encoding.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PathBuf,
        /// Details about the invalid data.
        details: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    // Native Errors
    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Attach operation and path context to a native I/O error.
    ///
    /// Kinds with a dedicated variant are mapped onto it; everything else is
    /// kept as [`FsError::Io`] with the original error as its source.
    pub fn io(operation: &'static str, path: &Path, error: io::Error) -> Self {
        let path = path.to_path_buf();
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path, operation },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path, operation },
            _ => FsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }

    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        FsError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the operation stopped because it was cancelled.
    ///
    /// Cancellation is requested by the caller, so most callers treat it as an
    /// expected outcome rather than a failure.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FsError::Cancelled { .. })
    }
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        FsError::io("io", Path::new(""), error)
    }
}
