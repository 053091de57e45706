//! Per-call configuration.
//!
//! Every operation takes one options value instead of a family of overloads.
//! `Default` gives UTF-8, the native line ending and a token that is never
//! cancelled; builder methods override individual fields.

use crate::{CancellationToken, Encoding, LineEnding};

/// Largest file [`read_bytes`](crate::read_bytes) loads by default (2 GiB - 1).
pub const DEFAULT_MAX_READ_LEN: u64 = 0x7FFF_FFFF;

/// Chunk size used by [`copy`](crate::copy) and [`move_file`](crate::move_file).
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 81_920;

/// Options for text, line and whole-buffer operations.
///
/// # Example
///
/// ```rust
/// use async_file_ops::{CancellationToken, Encoding, FileOptions, LineEnding};
///
/// let token = CancellationToken::new();
/// let options = FileOptions::default()
///     .with_encoding(Encoding::Utf16Le)
///     .with_line_ending(LineEnding::CrLf)
///     .with_cancellation(token.clone());
///
/// assert_eq!(options.encoding, Encoding::Utf16Le);
/// token.cancel();
/// assert!(options.cancellation.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Encoding used for text and line payloads.
    pub encoding: Encoding,
    /// Terminator appended to each written line.
    pub line_ending: LineEnding,
    /// Write the encoding's byte order mark when writing at offset 0.
    pub byte_order_mark: bool,
    /// Let a byte order mark found on read override [`encoding`](Self::encoding).
    pub detect_bom: bool,
    /// Files longer than this are refused by whole-buffer reads.
    pub max_read_len: u64,
    /// Checked at every checkpoint of the operation.
    pub cancellation: CancellationToken,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            line_ending: LineEnding::default(),
            byte_order_mark: false,
            detect_bom: true,
            max_read_len: DEFAULT_MAX_READ_LEN,
            cancellation: CancellationToken::none(),
        }
    }
}

impl FileOptions {
    /// Use `encoding` for text and line payloads.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Terminate written lines with `line_ending`.
    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Emit a byte order mark at offset 0.
    #[must_use]
    pub fn with_byte_order_mark(mut self, enabled: bool) -> Self {
        self.byte_order_mark = enabled;
        self
    }

    /// Honour a byte order mark on read.
    #[must_use]
    pub fn with_detect_bom(mut self, enabled: bool) -> Self {
        self.detect_bom = enabled;
        self
    }

    /// Refuse whole-buffer reads of files longer than `len` bytes.
    #[must_use]
    pub fn with_max_read_len(mut self, len: u64) -> Self {
        self.max_read_len = len;
        self
    }

    /// Observe `token` at every checkpoint.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// Options for [`copy`](crate::copy).
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Replace an existing destination instead of failing.
    pub overwrite: bool,
    /// Bytes transferred between cancellation checks.
    pub chunk_size: usize,
    /// Checked before every chunk.
    pub cancellation: CancellationToken,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            cancellation: CancellationToken::none(),
        }
    }
}

impl CopyOptions {
    /// Replace an existing destination.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Transfer `size` bytes between cancellation checks.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Observe `token` before every chunk.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_options_defaults() {
        let options = FileOptions::default();
        assert_eq!(options.encoding, Encoding::Utf8);
        assert_eq!(options.line_ending, LineEnding::native());
        assert!(!options.byte_order_mark);
        assert!(options.detect_bom);
        assert_eq!(options.max_read_len, DEFAULT_MAX_READ_LEN);
        assert!(!options.cancellation.is_cancelled());
    }

    #[test]
    fn copy_options_defaults() {
        let options = CopyOptions::default();
        assert!(!options.overwrite);
        assert_eq!(options.chunk_size, 81_920);
        assert!(!options.cancellation.is_cancelled());
    }

    #[test]
    fn builders_override_fields() {
        let options = FileOptions::default()
            .with_encoding(Encoding::Ascii)
            .with_byte_order_mark(true)
            .with_detect_bom(false)
            .with_max_read_len(16);
        assert_eq!(options.encoding, Encoding::Ascii);
        assert!(options.byte_order_mark);
        assert!(!options.detect_bom);
        assert_eq!(options.max_read_len, 16);

        let copy = CopyOptions::default().with_overwrite(true).with_chunk_size(4);
        assert!(copy.overwrite);
        assert_eq!(copy.chunk_size, 4);
    }

    #[test]
    fn cloned_options_share_cancellation() {
        let options = FileOptions::default().with_cancellation(CancellationToken::new());
        let clone = options.clone();
        options.cancellation.cancel();
        assert!(clone.cancellation.is_cancelled());
    }
}
