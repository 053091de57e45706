//! # Whole-File Operations
//!
//! Asynchronous read, write, append, copy, move and delete of single files.
//!
//! ## Shape
//!
//! Every operation runs the same steps:
//!
//! ```text
//! validate paths ──▶ open (narrowest mode) ──▶ transfer, checking the token ──▶ close
//! ```
//!
//! Handles are owned by the operation and dropped on every exit path, so a
//! failure or a cancellation never leaks an open file.
//!
//! ## Checkpoints
//!
//! | Operation | Cancellation is checked |
//! |-----------|-------------------------|
//! | [`append_lines`], [`write_lines`] | before each line |
//! | [`read_lines`] | before each read chunk and before each line |
//! | [`read_text`] | before each read chunk |
//! | [`copy`], [`move_file`] | before each chunk, and once after the last |
//! | [`append_text`], [`write_text`], [`read_bytes`], [`write_bytes`] | before and after the transfer |
//! | [`delete`] | before truncating |
//!
//! A cancelled operation returns [`FsError::Cancelled`] and leaves the file in
//! whatever state it reached; nothing is rolled back.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, trace};

use crate::encoding::CodecError;
use crate::options::DEFAULT_COPY_CHUNK_SIZE;
use crate::path_resolver::same_location;
use crate::types::{OpenMode, split_lines};
use crate::{CancellationToken, CopyOptions, FileOptions, FsError, validate_path};

// =============================================================================
// Append
// =============================================================================

/// Append lines to a file, creating it if it does not exist.
///
/// Each line is encoded with [`FileOptions::encoding`] and followed by
/// [`FileOptions::line_ending`]. Lines written before a cancellation or an
/// unencodable line stay in the file.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before a line
/// - [`FsError::InvalidData`] if a line is not representable in the encoding
/// - [`FsError::NotFound`] if the parent directory does not exist
///
/// # Example
///
/// ```rust,no_run
/// use async_file_ops::{append_lines, FileOptions, FsError};
///
/// # async fn demo() -> Result<(), FsError> {
/// append_lines("log.txt", ["first", "second"], &FileOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn append_lines<I, S>(
    path: impl AsRef<Path>,
    lines: I,
    options: &FileOptions,
) -> Result<(), FsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_lines_in("append_lines", OpenMode::Append, path.as_ref(), lines, options).await
}

/// Append text to a file, creating it if it does not exist.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before or after the write
/// - [`FsError::InvalidData`] if the text is not representable in the encoding
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn append_text(
    path: impl AsRef<Path>,
    text: impl AsRef<str>,
    options: &FileOptions,
) -> Result<(), FsError> {
    write_text_in(
        "append_text",
        OpenMode::Append,
        path.as_ref(),
        text.as_ref(),
        options,
    )
    .await
}

// =============================================================================
// Copy / Move / Delete
// =============================================================================

/// Copy a file, returning the number of bytes copied.
///
/// The destination is created exclusively unless [`CopyOptions::overwrite`] is
/// set, in which case it is created or truncated. Bytes are streamed in
/// [`CopyOptions::chunk_size`] chunks.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if a path is malformed or the chunk size is zero
/// - [`FsError::NotFound`] if `from` does not exist
/// - [`FsError::AlreadyExists`] if `to` exists and overwrite is off
/// - [`FsError::Cancelled`] mid-copy; the destination is left partially written
///
/// # Example
///
/// ```rust,no_run
/// use async_file_ops::{copy, CopyOptions, FsError};
///
/// # async fn demo() -> Result<(), FsError> {
/// let copied = copy("a.bin", "b.bin", &CopyOptions::default().with_overwrite(true)).await?;
/// println!("{copied} bytes");
/// # Ok(())
/// # }
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(from = %from.as_ref().display(), to = %to.as_ref().display(), overwrite = options.overwrite)
)]
pub async fn copy(
    from: impl AsRef<Path>,
    to: impl AsRef<Path>,
    options: &CopyOptions,
) -> Result<u64, FsError> {
    let (from, to) = (from.as_ref(), to.as_ref());
    validate_path(from)?;
    validate_path(to)?;
    copy_file(
        "copy",
        from,
        to,
        options.overwrite,
        options.chunk_size,
        &options.cancellation,
    )
    .await
}

/// Delete a file.
///
/// Succeeds without doing anything if `path` does not exist or is not a
/// regular file. Otherwise the file is truncated and then removed. A symlink
/// is removed without following it, so its target is left intact.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before the file is touched
/// - [`FsError::PermissionDenied`] or [`FsError::Io`] if the file is locked or in use
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn delete(
    path: impl AsRef<Path>,
    cancellation: &CancellationToken,
) -> Result<(), FsError> {
    let path = path.as_ref();
    validate_path(path)?;
    delete_file("delete", path, cancellation).await
}

/// Move a file by copying it and deleting the source.
///
/// Moving a file onto itself (compared canonically) is a no-op. The copy
/// never overwrites. The source is only deleted once the copy completed and
/// the token is still unset, so a cancelled move leaves the source in place
/// next to a partial destination.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if a path is malformed
/// - [`FsError::NotFound`] if `from` does not exist
/// - [`FsError::AlreadyExists`] if `to` exists
/// - [`FsError::Cancelled`] if the token is raised before the source is deleted
#[instrument(
    level = "debug",
    skip_all,
    fields(from = %from.as_ref().display(), to = %to.as_ref().display())
)]
pub async fn move_file(
    from: impl AsRef<Path>,
    to: impl AsRef<Path>,
    cancellation: &CancellationToken,
) -> Result<(), FsError> {
    let (from, to) = (from.as_ref(), to.as_ref());
    validate_path(from)?;
    validate_path(to)?;

    if same_location(from, to).await? {
        debug!("source and destination are the same file");
        return Ok(());
    }

    copy_file(
        "move",
        from,
        to,
        false,
        DEFAULT_COPY_CHUNK_SIZE,
        cancellation,
    )
    .await?;
    cancellation.check("move", from)?;
    delete_file("move", from, cancellation).await
}

// =============================================================================
// Read
// =============================================================================

/// Read a whole file into memory.
///
/// The buffer is sized from the file's current length up front.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed or the file is longer
///   than [`FileOptions::max_read_len`]
/// - [`FsError::NotFound`] if the file does not exist
/// - [`FsError::Cancelled`] if the token is raised before or after the read
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn read_bytes(
    path: impl AsRef<Path>,
    options: &FileOptions,
) -> Result<Vec<u8>, FsError> {
    const OP: &str = "read_bytes";
    let path = path.as_ref();
    validate_path(path)?;
    options.cancellation.check(OP, path)?;

    let mut file = OpenMode::Read.open(OP, path).await?;
    let capacity = buffer_capacity(OP, path, &file, options).await?;

    let mut bytes = Vec::with_capacity(capacity);
    file.read_to_end(&mut bytes)
        .await
        .map_err(|e| FsError::io(OP, path, e))?;
    trace!(len = bytes.len(), "read complete");

    options.cancellation.check(OP, path)?;
    Ok(bytes)
}

/// Read a file as lines.
///
/// Lines are split on `\n`, `\r\n` and `\r`; terminators are dropped and a
/// final terminator does not yield an empty trailing line.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed or the file is longer
///   than [`FileOptions::max_read_len`]
/// - [`FsError::NotFound`] if the file does not exist
/// - [`FsError::InvalidData`] if the content does not decode
/// - [`FsError::Cancelled`] if the token is raised before a chunk or a line
///
/// # Example
///
/// ```rust,no_run
/// use async_file_ops::{read_lines, Encoding, FileOptions, FsError};
///
/// # async fn demo() -> Result<(), FsError> {
/// let options = FileOptions::default().with_encoding(Encoding::Utf16Le);
/// for line in read_lines("names.txt", &options).await? {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn read_lines(
    path: impl AsRef<Path>,
    options: &FileOptions,
) -> Result<Vec<String>, FsError> {
    const OP: &str = "read_lines";
    let path = path.as_ref();
    validate_path(path)?;

    let text = read_decoded(OP, path, options).await?;
    let mut lines = Vec::new();
    for line in split_lines(&text) {
        options.cancellation.check(OP, path)?;
        lines.push(line.to_owned());
    }
    trace!(lines = lines.len(), "read complete");
    Ok(lines)
}

/// Read a whole file as text.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed or the file is longer
///   than [`FileOptions::max_read_len`]
/// - [`FsError::NotFound`] if the file does not exist
/// - [`FsError::InvalidData`] if the content does not decode
/// - [`FsError::Cancelled`] if the token is raised before a chunk
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn read_text(path: impl AsRef<Path>, options: &FileOptions) -> Result<String, FsError> {
    let path = path.as_ref();
    validate_path(path)?;
    read_decoded("read_text", path, options).await
}

// =============================================================================
// Write
// =============================================================================

/// Write bytes to a file, creating or truncating it.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before or after the write
/// - [`FsError::NotFound`] if the parent directory does not exist
#[instrument(
    level = "debug",
    skip_all,
    fields(path = %path.as_ref().display(), len = bytes.as_ref().len())
)]
pub async fn write_bytes(
    path: impl AsRef<Path>,
    bytes: impl AsRef<[u8]>,
    cancellation: &CancellationToken,
) -> Result<(), FsError> {
    const OP: &str = "write_bytes";
    let path = path.as_ref();
    validate_path(path)?;
    cancellation.check(OP, path)?;

    let mut file = OpenMode::Truncate.open(OP, path).await?;
    write_flushed(OP, path, &mut file, bytes.as_ref()).await?;
    cancellation.check(OP, path)
}

/// Write lines to a file, creating or truncating it.
///
/// Each line is encoded with [`FileOptions::encoding`] and followed by
/// [`FileOptions::line_ending`]. If a line cannot be encoded, the lines before
/// it are kept.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before a line
/// - [`FsError::InvalidData`] if a line is not representable in the encoding
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_lines<I, S>(
    path: impl AsRef<Path>,
    lines: I,
    options: &FileOptions,
) -> Result<(), FsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_lines_in("write_lines", OpenMode::Truncate, path.as_ref(), lines, options).await
}

/// Write text to a file, creating or truncating it.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] if `path` is malformed
/// - [`FsError::Cancelled`] if the token is raised before or after the write
/// - [`FsError::InvalidData`] if the text is not representable in the encoding
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_text(
    path: impl AsRef<Path>,
    text: impl AsRef<str>,
    options: &FileOptions,
) -> Result<(), FsError> {
    write_text_in(
        "write_text",
        OpenMode::Truncate,
        path.as_ref(),
        text.as_ref(),
        options,
    )
    .await
}

// =============================================================================
// Shared steps
// =============================================================================

async fn write_lines_in<I, S>(
    operation: &'static str,
    mode: OpenMode,
    path: &Path,
    lines: I,
    options: &FileOptions,
) -> Result<(), FsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    validate_path(path)?;

    let file = mode.open(operation, path).await?;
    let preamble = preamble_for(operation, path, &file, mode, options).await?;
    let mut writer = BufWriter::new(file);
    let io_err = |e| FsError::io(operation, path, e);

    writer.write_all(preamble).await.map_err(io_err)?;

    let mut buf = Vec::new();
    let mut written = 0usize;
    for line in lines {
        if let Err(cancelled) = options.cancellation.check(operation, path) {
            writer.flush().await.map_err(io_err)?;
            debug!(written, "stopped before completing");
            return Err(cancelled);
        }
        buf.clear();
        let encoded = encode_into(options, line.as_ref(), path, &mut buf)
            .and_then(|()| encode_into(options, options.line_ending.as_str(), path, &mut buf));
        if let Err(unencodable) = encoded {
            writer.flush().await.map_err(io_err)?;
            debug!(written, "line not representable in the encoding");
            return Err(unencodable);
        }
        writer.write_all(&buf).await.map_err(io_err)?;
        written += 1;
    }

    writer.flush().await.map_err(io_err)?;
    trace!(written, "lines written");
    Ok(())
}

async fn write_text_in(
    operation: &'static str,
    mode: OpenMode,
    path: &Path,
    text: &str,
    options: &FileOptions,
) -> Result<(), FsError> {
    validate_path(path)?;
    options.cancellation.check(operation, path)?;

    // Encode before opening so an unencodable payload leaves the file untouched.
    let mut payload = Vec::with_capacity(text.len());
    encode_into(options, text, path, &mut payload)?;

    let mut file = mode.open(operation, path).await?;
    let preamble = preamble_for(operation, path, &file, mode, options).await?;
    file.write_all(preamble)
        .await
        .map_err(|e| FsError::io(operation, path, e))?;
    write_flushed(operation, path, &mut file, &payload).await?;
    options.cancellation.check(operation, path)
}

async fn copy_file(
    operation: &'static str,
    from: &Path,
    to: &Path,
    overwrite: bool,
    chunk_size: usize,
    cancellation: &CancellationToken,
) -> Result<u64, FsError> {
    if chunk_size == 0 {
        return Err(FsError::invalid_argument(
            "chunk_size",
            "must be greater than zero",
        ));
    }

    let mut source = OpenMode::Read.open(operation, from).await?;
    let dest_mode = if overwrite {
        OpenMode::Truncate
    } else {
        OpenMode::CreateNew
    };
    let mut dest = dest_mode.open(operation, to).await?;

    let mut chunk = vec![0u8; chunk_size];
    let mut copied = 0u64;
    loop {
        if let Err(cancelled) = cancellation.check(operation, to) {
            dest.flush().await.map_err(|e| FsError::io(operation, to, e))?;
            debug!(copied, "stopped before completing");
            return Err(cancelled);
        }
        let n = source
            .read(&mut chunk)
            .await
            .map_err(|e| FsError::io(operation, from, e))?;
        if n == 0 {
            break;
        }
        dest.write_all(&chunk[..n])
            .await
            .map_err(|e| FsError::io(operation, to, e))?;
        copied += n as u64;
    }
    dest.flush().await.map_err(|e| FsError::io(operation, to, e))?;
    trace!(copied, "copy complete");

    cancellation.check(operation, to)?;
    Ok(copied)
}

async fn delete_file(
    operation: &'static str,
    path: &Path,
    cancellation: &CancellationToken,
) -> Result<(), FsError> {
    // The link itself is inspected; truncating must never reach a symlink target.
    let is_symlink = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.file_type().is_symlink() => true,
        Ok(meta) if meta.is_file() => false,
        Ok(_) => {
            debug!("not a regular file, nothing to delete");
            return Ok(());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("already absent");
            return Ok(());
        }
        Err(e) => return Err(FsError::io(operation, path, e)),
    };
    cancellation.check(operation, path)?;

    if is_symlink {
        debug!("removing symlink without touching its target");
        return remove_if_present(operation, path).await;
    }

    truncate_and_remove(operation, path).await
}

/// Truncate a regular file, then unlink it. A file that disappears in between
/// counts as deleted.
async fn truncate_and_remove(operation: &'static str, path: &Path) -> Result<(), FsError> {
    let mut file = match OpenMode::TruncateForDelete.open(operation, path).await {
        Ok(file) => file,
        Err(FsError::NotFound { .. }) => {
            debug!("removed concurrently");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    file.flush()
        .await
        .map_err(|e| FsError::io(operation, path, e))?;
    drop(file);
    remove_if_present(operation, path).await
}

async fn remove_if_present(operation: &'static str, path: &Path) -> Result<(), FsError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FsError::io(operation, path, e)),
    }
}

/// Read the whole file in chunks and decode it.
async fn read_decoded(
    operation: &'static str,
    path: &Path,
    options: &FileOptions,
) -> Result<String, FsError> {
    options.cancellation.check(operation, path)?;

    let mut file = OpenMode::Read.open(operation, path).await?;
    let capacity = buffer_capacity(operation, path, &file, options).await?;
    let mut bytes = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; DEFAULT_COPY_CHUNK_SIZE];
    loop {
        options.cancellation.check(operation, path)?;
        let n = file
            .read(&mut chunk)
            .await
            .map_err(|e| FsError::io(operation, path, e))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
    }
    drop(file);

    decode_payload(&bytes, options).map_err(|e| invalid_data(path, &e))
}

/// Decode file content, honouring or stripping a byte order mark.
fn decode_payload(bytes: &[u8], options: &FileOptions) -> Result<String, CodecError> {
    if options.detect_bom {
        if let Some((encoding, mark)) = crate::Encoding::detect_bom(bytes) {
            return encoding.decode(&bytes[mark..]);
        }
    }
    let body = bytes
        .strip_prefix(options.encoding.preamble())
        .unwrap_or(bytes);
    options.encoding.decode(body)
}

/// Preamble to emit before the first byte, if the file is positioned at offset 0.
async fn preamble_for(
    operation: &'static str,
    path: &Path,
    file: &File,
    mode: OpenMode,
    options: &FileOptions,
) -> Result<&'static [u8], FsError> {
    if !options.byte_order_mark {
        return Ok(&[]);
    }
    let at_start = match mode {
        OpenMode::Append => file_len(operation, path, file).await? == 0,
        _ => true,
    };
    Ok(if at_start {
        options.encoding.preamble()
    } else {
        &[]
    })
}

async fn write_flushed(
    operation: &'static str,
    path: &Path,
    file: &mut File,
    bytes: &[u8],
) -> Result<(), FsError> {
    file.write_all(bytes)
        .await
        .map_err(|e| FsError::io(operation, path, e))?;
    file.flush()
        .await
        .map_err(|e| FsError::io(operation, path, e))
}

/// Size of the buffer needed to hold the whole file.
///
/// Refuses files longer than [`FileOptions::max_read_len`] before anything is
/// allocated.
async fn buffer_capacity(
    operation: &'static str,
    path: &Path,
    file: &File,
    options: &FileOptions,
) -> Result<usize, FsError> {
    let len = file_len(operation, path, file).await?;
    if len > options.max_read_len {
        return Err(FsError::invalid_argument(
            "path",
            format!(
                "file is {len} bytes, larger than the {} byte limit",
                options.max_read_len
            ),
        ));
    }
    usize::try_from(len).map_err(|_| {
        FsError::invalid_argument("path", format!("file is {len} bytes, too large to buffer"))
    })
}

async fn file_len(operation: &'static str, path: &Path, file: &File) -> Result<u64, FsError> {
    file.metadata()
        .await
        .map(|meta| meta.len())
        .map_err(|e| FsError::io(operation, path, e))
}

fn encode_into(
    options: &FileOptions,
    text: &str,
    path: &Path,
    out: &mut Vec<u8>,
) -> Result<(), FsError> {
    options
        .encoding
        .encode(text, out)
        .map_err(|e| invalid_data(path, &e))
}

fn invalid_data(path: &Path, error: &CodecError) -> FsError {
    FsError::InvalidData {
        path: path.to_path_buf(),
        details: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;

    #[test]
    fn decode_payload_detects_bom_over_requested_encoding() {
        let mut bytes = Encoding::Utf16Be.preamble().to_vec();
        Encoding::Utf16Be.encode("hey", &mut bytes).unwrap();
        let text = decode_payload(&bytes, &FileOptions::default()).unwrap();
        assert_eq!(text, "hey");
    }

    #[test]
    fn decode_payload_strips_own_preamble_without_detection() {
        let options = FileOptions::default().with_detect_bom(false);
        let bytes = [0xEF, 0xBB, 0xBF, b'o', b'k'];
        assert_eq!(decode_payload(&bytes, &options).unwrap(), "ok");
    }

    #[test]
    fn decode_payload_reports_malformed_input() {
        let options = FileOptions::default().with_encoding(Encoding::Ascii);
        let err = decode_payload(&[0xFF, 0x41], &options);
        // 0xFF 0x41 is not a recognised mark, so ASCII decoding fails.
        assert!(err.is_err());
    }

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("line {i}")).collect()
    }

    #[tokio::test]
    async fn copy_cancelled_between_chunks_leaves_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let (from, to) = (dir.path().join("src.bin"), dir.path().join("dst.bin"));
        let source: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(&from, &source).await.unwrap();

        let options = CopyOptions::default()
            .with_chunk_size(512)
            .with_cancellation(CancellationToken::cancel_after_checks(2));
        let err = crate::copy(&from, &to, &options).await.unwrap_err();
        assert!(err.is_cancelled());

        let partial = tokio::fs::read(&to).await.unwrap();
        assert_eq!(partial.len(), 1024);
        assert_eq!(partial, source[..1024]);
    }

    #[tokio::test]
    async fn move_cancelled_mid_copy_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let (from, to) = (dir.path().join("src.bin"), dir.path().join("dst.bin"));
        let source = vec![7u8; DEFAULT_COPY_CHUNK_SIZE * 3];
        tokio::fs::write(&from, &source).await.unwrap();

        let token = CancellationToken::cancel_after_checks(1);
        let err = crate::move_file(&from, &to, &token).await.unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(tokio::fs::read(&from).await.unwrap(), source);
        let partial = tokio::fs::read(&to).await.unwrap();
        assert_eq!(partial.len(), DEFAULT_COPY_CHUNK_SIZE);
    }

    #[tokio::test]
    async fn move_cancelled_after_copy_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let (from, to) = (dir.path().join("src.bin"), dir.path().join("dst.bin"));
        tokio::fs::write(&from, b"whole").await.unwrap();

        // One chunk, the end-of-file read, then the post-copy check.
        let token = CancellationToken::cancel_after_checks(3);
        let err = crate::move_file(&from, &to, &token).await.unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(tokio::fs::read(&from).await.unwrap(), b"whole");
        assert_eq!(tokio::fs::read(&to).await.unwrap(), b"whole");
    }

    #[tokio::test]
    async fn read_lines_cancelled_between_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        crate::write_lines(&path, numbered(100), &FileOptions::default())
            .await
            .unwrap();

        // Three checks go to opening and reading; the rest are per line.
        let options =
            FileOptions::default().with_cancellation(CancellationToken::cancel_after_checks(10));
        let err = crate::read_lines(&path, &options).await.unwrap_err();
        assert!(matches!(
            err,
            FsError::Cancelled {
                operation: "read_lines",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn write_lines_cancelled_midway_flushes_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        let options = FileOptions::default()
            .with_line_ending(crate::LineEnding::Lf)
            .with_cancellation(CancellationToken::cancel_after_checks(5));

        let err = crate::write_lines(&path, numbered(100), &options)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let back = crate::read_lines(&path, &FileOptions::default()).await.unwrap();
        assert_eq!(back, numbered(5));
    }

    #[tokio::test]
    async fn unencodable_line_keeps_lines_before_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascii.txt");
        let options = FileOptions::default()
            .with_encoding(Encoding::Ascii)
            .with_line_ending(crate::LineEnding::Lf);

        let err = crate::write_lines(&path, ["ok", "caf\u{e9}", "never"], &options)
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidData { .. }));

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"ok\n");
    }

    #[tokio::test]
    async fn text_reads_enforce_length_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.txt");
        tokio::fs::write(&path, b"0123456789").await.unwrap();
        let options = FileOptions::default().with_max_read_len(4);

        let err = crate::read_text(&path, &options).await.unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { name: "path", .. }));
        let err = crate::read_lines(&path, &options).await.unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { name: "path", .. }));

        let fits = FileOptions::default().with_max_read_len(10);
        assert_eq!(crate::read_text(&path, &fits).await.unwrap(), "0123456789");
    }

    #[tokio::test]
    async fn oversized_sparse_file_is_refused_before_buffering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.bin");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(3 << 30).unwrap();
        drop(file);

        let err = crate::read_text(&path, &FileOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
        let err = crate::read_lines(&path, &FileOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn file_vanishing_before_truncate_counts_as_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        truncate_and_remove("delete", &path).await.unwrap();
        remove_if_present("delete", &path).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn deleting_symlink_spares_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        tokio::fs::write(&target, b"precious data").await.unwrap();
        tokio::fs::symlink(&target, &link).await.unwrap();

        crate::delete(&link, &CancellationToken::none()).await.unwrap();

        assert!(tokio::fs::symlink_metadata(&link).await.is_err());
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"precious data");
    }

    #[test]
    fn invalid_data_carries_path() {
        let err = invalid_data(
            Path::new("/x"),
            &CodecError {
                encoding: "us-ascii",
                details: "bad".into(),
            },
        );
        assert_eq!(err.to_string(), "invalid data: /x (us-ascii: bad)");
    }
}
