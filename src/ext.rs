//! # Extension Traits
//!
//! Method-call access to the file operations on [`Path`] and [`PathBuf`].
//!
//! ## Overview
//!
//! [`FileExt`] mirrors every free function in this crate as a method on the
//! path itself. Each method forwards to the free function, so validation,
//! options and cancellation behave exactly the same.
//!
//! ## Available Methods
//!
//! | Method | Forwards to |
//! |--------|-------------|
//! | [`append_lines`](FileExt::append_lines) / [`append_text`](FileExt::append_text) | [`crate::append_lines`] / [`crate::append_text`] |
//! | [`copy_to`](FileExt::copy_to) | [`crate::copy`] |
//! | [`delete`](FileExt::delete) | [`crate::delete`] |
//! | [`move_to`](FileExt::move_to) | [`crate::move_file`] |
//! | [`read_bytes`](FileExt::read_bytes) / [`read_lines`](FileExt::read_lines) / [`read_text`](FileExt::read_text) | the matching readers |
//! | [`write_bytes`](FileExt::write_bytes) / [`write_lines`](FileExt::write_lines) / [`write_text`](FileExt::write_text) | the matching writers |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, JSON documents can be read and written
//! through the text operations, so they pick up the same encoding, path
//! validation and cancellation behaviour.
//!
//! | Function | Description |
//! |----------|-------------|
//! | `read_json` | Read and deserialize JSON file |
//! | `write_json` | Serialize and write JSON file |
//!
//! Enable with:
//! ```toml
//! [dependencies]
//! async-file-ops = { version = "0.1", features = ["serde"] }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::{CancellationToken, CopyOptions, FileOptions, FsError};

/// File operations as methods on a path.
///
/// # Example
///
/// ```rust,no_run
/// use async_file_ops::{FileExt, FileOptions, FsError};
/// use std::path::Path;
///
/// # async fn demo() -> Result<(), FsError> {
/// let notes = Path::new("notes.txt");
/// notes.write_lines(["one", "two"], &FileOptions::default()).await?;
/// let lines = notes.read_lines(&FileOptions::default()).await?;
/// assert_eq!(lines.len(), 2);
/// # Ok(())
/// # }
/// ```
pub trait FileExt: AsRef<Path> {
    /// Append lines to this file. See [`crate::append_lines`].
    fn append_lines<'a, I, S>(
        &'a self,
        lines: I,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        I: IntoIterator<Item = S> + Send + 'a,
        I::IntoIter: Send,
        S: AsRef<str> + Send + 'a,
    {
        crate::append_lines(self.as_ref(), lines, options)
    }

    /// Append text to this file. See [`crate::append_text`].
    fn append_text<'a, T>(
        &'a self,
        text: T,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        T: AsRef<str> + Send + 'a,
    {
        crate::append_text(self.as_ref(), text, options)
    }

    /// Copy this file to `dest`, returning the number of bytes copied.
    /// See [`crate::copy`].
    fn copy_to<'a, D>(
        &'a self,
        dest: D,
        options: &'a CopyOptions,
    ) -> impl Future<Output = Result<u64, FsError>> + Send + 'a
    where
        D: AsRef<Path> + Send + 'a,
    {
        crate::copy(self.as_ref(), dest, options)
    }

    /// Delete this file. See [`crate::delete`].
    fn delete<'a>(
        &'a self,
        cancellation: &'a CancellationToken,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a {
        crate::delete(self.as_ref(), cancellation)
    }

    /// Move this file to `dest`. See [`crate::move_file`].
    fn move_to<'a, D>(
        &'a self,
        dest: D,
        cancellation: &'a CancellationToken,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        D: AsRef<Path> + Send + 'a,
    {
        crate::move_file(self.as_ref(), dest, cancellation)
    }

    /// Read this file into memory. See [`crate::read_bytes`].
    fn read_bytes<'a>(
        &'a self,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<Vec<u8>, FsError>> + Send + 'a {
        crate::read_bytes(self.as_ref(), options)
    }

    /// Read this file as lines. See [`crate::read_lines`].
    fn read_lines<'a>(
        &'a self,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<Vec<String>, FsError>> + Send + 'a {
        crate::read_lines(self.as_ref(), options)
    }

    /// Read this file as text. See [`crate::read_text`].
    fn read_text<'a>(
        &'a self,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<String, FsError>> + Send + 'a {
        crate::read_text(self.as_ref(), options)
    }

    /// Write bytes to this file. See [`crate::write_bytes`].
    fn write_bytes<'a, B>(
        &'a self,
        bytes: B,
        cancellation: &'a CancellationToken,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        B: AsRef<[u8]> + Send + 'a,
    {
        crate::write_bytes(self.as_ref(), bytes, cancellation)
    }

    /// Write lines to this file. See [`crate::write_lines`].
    fn write_lines<'a, I, S>(
        &'a self,
        lines: I,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        I: IntoIterator<Item = S> + Send + 'a,
        I::IntoIter: Send,
        S: AsRef<str> + Send + 'a,
    {
        crate::write_lines(self.as_ref(), lines, options)
    }

    /// Write text to this file. See [`crate::write_text`].
    fn write_text<'a, T>(
        &'a self,
        text: T,
        options: &'a FileOptions,
    ) -> impl Future<Output = Result<(), FsError>> + Send + 'a
    where
        T: AsRef<str> + Send + 'a,
    {
        crate::write_text(self.as_ref(), text, options)
    }
}

impl FileExt for Path {}
impl FileExt for PathBuf {}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use std::path::Path;

    use serde::{Serialize, de::DeserializeOwned};

    use crate::{FileOptions, FsError, read_text, write_text};

    /// Read a file and deserialize it as JSON.
    ///
    /// # Errors
    ///
    /// - `FsError::NotFound` — File doesn't exist
    /// - `FsError::InvalidData` — File doesn't decode in the configured encoding
    /// - `FsError::Deserialization` — JSON parsing failed
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use async_file_ops::{read_json, FileOptions, FsError};
    ///
    /// # async fn demo() -> Result<(), FsError> {
    /// let config: serde_json::Value = read_json("config.json", &FileOptions::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_json<T: DeserializeOwned>(
        path: impl AsRef<Path>,
        options: &FileOptions,
    ) -> Result<T, FsError> {
        let data = read_text(path, options).await?;
        serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
    }

    /// Serialize a value and write it as JSON.
    ///
    /// Uses pretty-printing with 2-space indentation.
    ///
    /// # Errors
    ///
    /// - `FsError::Serialization` — JSON serialization failed
    /// - Other `FsError` variants from the underlying [`write_text`] call
    pub async fn write_json<T: Serialize + ?Sized>(
        path: impl AsRef<Path>,
        value: &T,
        options: &FileOptions,
    ) -> Result<(), FsError> {
        let json =
            serde_json::to_string_pretty(value).map_err(|e| FsError::Serialization(e.to_string()))?;
        write_text(path, json, options).await
    }
}

#[cfg(feature = "serde")]
pub use json::{read_json, write_json};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoding, LineEnding};

    #[tokio::test]
    async fn methods_forward_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        let options = FileOptions::default()
            .with_encoding(Encoding::Utf16Le)
            .with_line_ending(LineEnding::CrLf);

        path.write_lines(["ada", "grace"], &options).await.unwrap();
        path.append_text("linus\r\n", &options).await.unwrap();

        let raw = path.read_bytes(&options).await.unwrap();
        assert_eq!(&raw[..4], &[b'a', 0, b'd', 0]);
        assert_eq!(
            path.read_lines(&options).await.unwrap(),
            ["ada", "grace", "linus"]
        );
        assert_eq!(
            crate::read_text(&path, &options).await.unwrap(),
            path.read_text(&options).await.unwrap()
        );
    }

    #[tokio::test]
    async fn copy_move_and_delete_through_paths() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.bin");
        let copied = dir.path().join("b.bin");
        let moved = dir.path().join("c.bin");
        let none = CancellationToken::none();

        src.write_bytes([1u8, 2, 3], &none).await.unwrap();
        assert_eq!(src.copy_to(&copied, &CopyOptions::default()).await.unwrap(), 3);
        copied.as_path().move_to(&moved, &none).await.unwrap();
        src.delete(&none).await.unwrap();

        assert!(!tokio::fs::try_exists(&src).await.unwrap());
        assert!(!tokio::fs::try_exists(&copied).await.unwrap());
        assert_eq!(tokio::fs::read(&moved).await.unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn methods_honour_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.txt");
        let token = CancellationToken::new();
        path.write_text("stay", &FileOptions::default())
            .await
            .unwrap();
        token.cancel();

        assert!(path.delete(&token).await.unwrap_err().is_cancelled());
        let options = FileOptions::default().with_cancellation(token.clone());
        assert!(path.read_text(&options).await.unwrap_err().is_cancelled());
        assert!(
            path.move_to(dir.path().join("gone.txt"), &token)
                .await
                .unwrap_err()
                .is_cancelled()
        );
        assert!(tokio::fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn futures_can_be_spawned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spawned.txt");
        let handle = tokio::spawn(async move {
            let options = FileOptions::default();
            path.write_lines(vec!["x".to_owned()], &options)
                .await
                .unwrap();
            path.read_lines(&options).await.unwrap()
        });
        assert_eq!(handle.await.unwrap(), ["x"]);
    }

    #[tokio::test]
    async fn malformed_path_is_rejected() {
        let err = Path::new("   ")
            .read_text(&FileOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
    }

    #[cfg(feature = "serde")]
    mod json {
        use super::super::*;
        use crate::{Encoding, LineEnding, read_text, write_text};

        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Settings {
            name: String,
            encoding: Encoding,
            line_ending: LineEnding,
        }

        #[tokio::test]
        async fn json_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");
            let settings = Settings {
                name: "nightly".into(),
                encoding: Encoding::Utf16Be,
                line_ending: LineEnding::CrLf,
            };

            write_json(&path, &settings, &FileOptions::default())
                .await
                .unwrap();
            let text = read_text(&path, &FileOptions::default()).await.unwrap();
            assert!(text.contains("\"utf16be\""));
            assert!(text.contains("\"crlf\""));

            let back: Settings = read_json(&path, &FileOptions::default()).await.unwrap();
            assert_eq!(back, settings);
        }

        #[tokio::test]
        async fn malformed_json_is_deserialization_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("broken.json");
            write_text(&path, "{ not json", &FileOptions::default())
                .await
                .unwrap();

            let result: Result<Settings, _> = read_json(&path, &FileOptions::default()).await;
            assert!(matches!(result, Err(FsError::Deserialization(_))));
        }
    }
}
