//! # async-file-ops
//!
//! Asynchronous whole-file operations with **cooperative cancellation** and
//! **path validation**, built on `tokio::fs`.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_file_ops::{append_lines, read_lines, write_lines, FileOptions, FsError};
//!
//! # async fn demo() -> Result<(), FsError> {
//! let options = FileOptions::default();
//! write_lines("notes.txt", ["one", "two"], &options).await?;
//! append_lines("notes.txt", ["three"], &options).await?;
//! assert_eq!(read_lines("notes.txt", &options).await?.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Operations
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`append_lines`] / [`append_text`] | Append to a file, creating it if absent |
//! | [`write_lines`] / [`write_text`] / [`write_bytes`] | Create or truncate, then write |
//! | [`read_lines`] / [`read_text`] / [`read_bytes`] | Read a whole file |
//! | [`copy`] | Chunked copy, exclusive unless overwrite is requested |
//! | [`move_file`] | Copy then delete the source; same-file moves are no-ops |
//! | [`delete`] | Truncate and remove; absent paths are fine |
//!
//! The same operations are available as methods on [`Path`](std::path::Path)
//! and [`PathBuf`](std::path::PathBuf) through [`FileExt`].
//!
//! Every operation takes a single options value instead of overloads:
//! [`FileOptions`] (encoding, line ending, cancellation, ...) or
//! [`CopyOptions`] (overwrite, chunk size, cancellation). Operations that
//! carry no text take a bare [`CancellationToken`].
//!
//! ---
//!
//! ## Cancellation
//!
//! A [`CancellationToken`] is checked between discrete units of work: each
//! line, each copy chunk, or before and after a single whole-buffer transfer.
//! A unit already in flight always completes. A cancelled operation returns
//! [`FsError::Cancelled`] and leaves the file as it stood; there is no
//! rollback.
//!
//! ```rust,no_run
//! use async_file_ops::{write_lines, CancellationToken, FileOptions};
//!
//! # async fn demo() {
//! let token = CancellationToken::new();
//! let options = FileOptions::default().with_cancellation(token.clone());
//! token.cancel();
//!
//! let err = write_lines("out.txt", ["never"], &options).await.unwrap_err();
//! assert!(err.is_cancelled());
//! # }
//! ```
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors include context:
//!
//! ```rust
//! use async_file_ops::FsError;
//! use std::path::PathBuf;
//!
//! let err = FsError::AlreadyExists {
//!     path: PathBuf::from("/dest.bin"),
//!     operation: "copy",
//! };
//! assert_eq!(err.to_string(), "copy: already exists: /dest.bin");
//! ```
//!
//! Malformed arguments fail with [`FsError::InvalidArgument`] before any I/O.
//! Native failures keep their `std::io::Error` as the source.
//!
//! ---
//!
//! ## Logging
//!
//! Operations emit `tracing` spans at `debug` level. No subscriber is
//! installed by this crate.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Encoding`] and [`LineEnding`], plus `read_json` / `write_json` |

// Private modules
mod cancel;
mod encoding;
mod error;
mod ext;
mod file;
mod options;
mod path_resolver;
mod path_validator;
mod types;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use cancel::CancellationToken;
pub use encoding::{CodecError, Encoding};
pub use options::{CopyOptions, DEFAULT_COPY_CHUNK_SIZE, DEFAULT_MAX_READ_LEN, FileOptions};
pub use types::{LineEnding, OpenMode};

// Public re-exports - operations
pub use file::{
    append_lines, append_text, copy, delete, move_file, read_bytes, read_lines, read_text,
    write_bytes, write_lines, write_text,
};

// Public re-exports - extension traits
pub use ext::FileExt;

// Public re-exports - paths
pub use path_resolver::{canonicalize, same_location, soft_canonicalize};
pub use path_validator::{INVALID_PATH_CHARS, validate_path};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::{read_json, write_json};
