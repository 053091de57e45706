//! Core types: how files are opened and how lines are terminated.

use std::path::Path;

use tokio::fs::{File, OpenOptions};

use crate::FsError;

/// How an operation opens its file.
///
/// Each mode carries the narrowest access the operation needs. On Windows the
/// sharing mode is narrowed as well; other platforms have no mandatory
/// sharing and rely on native semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Existing file, read-only, others may read.
    Read,
    /// Create if absent, position at end, exclusive.
    Append,
    /// Create or truncate, exclusive.
    Truncate,
    /// Create, failing if the file already exists, exclusive.
    CreateNew,
    /// Existing file, truncate to zero, others may delete.
    TruncateForDelete,
}

impl OpenMode {
    /// Options equivalent to this mode.
    pub fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Append => {
                options.append(true).create(true);
            }
            OpenMode::Truncate => {
                options.write(true).create(true).truncate(true);
            }
            OpenMode::CreateNew => {
                options.write(true).create_new(true);
            }
            OpenMode::TruncateForDelete => {
                options.write(true).truncate(true);
            }
        }
        #[cfg(windows)]
        options.share_mode(self.share_mode());
        options
    }

    #[cfg(windows)]
    const fn share_mode(self) -> u32 {
        const FILE_SHARE_READ: u32 = 0x1;
        const FILE_SHARE_DELETE: u32 = 0x4;
        match self {
            OpenMode::Read => FILE_SHARE_READ,
            OpenMode::TruncateForDelete => FILE_SHARE_DELETE,
            OpenMode::Append | OpenMode::Truncate | OpenMode::CreateNew => 0,
        }
    }

    /// Open `path` in this mode, attaching `operation` to any failure.
    ///
    /// # Errors
    ///
    /// Native open failures mapped through [`FsError::io`].
    pub async fn open(self, operation: &'static str, path: &Path) -> Result<File, FsError> {
        self.options()
            .open(path)
            .await
            .map_err(|e| FsError::io(operation, path, e))
    }
}

/// Terminator written after each line by the line-oriented writers.
///
/// Readers accept all three regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    /// The platform's conventional terminator.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// The terminator as text.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

/// Split decoded text into lines.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`; terminators are not included.
/// A terminator at the very end does not produce a trailing empty line.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(at) => {
                let line = &rest[..at];
                let skip = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[at + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        split_lines(text).collect()
    }

    #[test]
    fn split_mixed_terminators() {
        assert_eq!(lines("a\nb\r\nc\rd"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn split_no_trailing_empty_line() {
        assert_eq!(lines("a\nb\n"), ["a", "b"]);
        assert_eq!(lines("a\r\n"), ["a"]);
    }

    #[test]
    fn split_keeps_inner_empty_lines() {
        assert_eq!(lines("a\n\n\r\nb"), ["a", "", "", "b"]);
        assert_eq!(lines("\n"), [""]);
    }

    #[test]
    fn split_empty_text_has_no_lines() {
        assert!(lines("").is_empty());
    }

    #[test]
    fn line_ending_strings() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
        assert_eq!(LineEnding::Cr.as_str(), "\r");
        assert_eq!(LineEnding::default(), LineEnding::native());
    }

    #[test]
    fn open_modes_are_distinct() {
        let modes = [
            OpenMode::Read,
            OpenMode::Append,
            OpenMode::Truncate,
            OpenMode::CreateNew,
            OpenMode::TruncateForDelete,
        ];
        let unique: std::collections::HashSet<_> = modes.iter().collect();
        assert_eq!(unique.len(), modes.len());
    }
}
