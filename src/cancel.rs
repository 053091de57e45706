//! Cooperative cancellation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::atomic::AtomicUsize;

use crate::FsError;

/// A caller-owned flag requesting early termination of an in-flight operation.
///
/// Clones share the same flag, so a clone handed to an operation observes a
/// `cancel()` made through any other clone. Operations only look at the flag
/// at their checkpoints (each line, each chunk, or before and after a single
/// whole-buffer transfer); nothing is interrupted preemptively.
///
/// # Example
///
/// ```rust
/// use async_file_ops::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
///
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    /// Checkpoints left before the token cancels itself.
    #[cfg(test)]
    trip_after: Option<Arc<AtomicUsize>>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token nobody else holds, so it is never cancelled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A token that lets `checks` checkpoints pass and cancels at the next one.
    #[cfg(test)]
    pub(crate) fn cancel_after_checks(checks: usize) -> Self {
        Self {
            trip_after: Some(Arc::new(AtomicUsize::new(checks))),
            ..Self::default()
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint: fail with [`FsError::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// - [`FsError::Cancelled`] carrying `operation` and `path`
    pub fn check(&self, operation: &'static str, path: &Path) -> Result<(), FsError> {
        #[cfg(test)]
        if let Some(remaining) = &self.trip_after {
            let spent = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err();
            if spent {
                self.cancel();
            }
        }
        if self.is_cancelled() {
            tracing::debug!(operation, path = %path.display(), "cancellation observed");
            return Err(FsError::Cancelled {
                operation,
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}
