//! Text encodings used to map line and text payloads to and from bytes.
//!
//! Only the fixed set of Unicode transformation formats plus 7-bit ASCII is
//! supported. Every conversion is strict: a character the encoding cannot
//! represent, or a byte sequence it cannot decode, is reported as a
//! [`CodecError`] instead of being replaced.

use crate::FsError;

/// A named text-encoding scheme.
///
/// Defaults to [`Encoding::Utf8`].
///
/// # Example
///
/// ```rust
/// use async_file_ops::Encoding;
///
/// let enc = Encoding::from_label("UTF-16BE").unwrap();
/// assert_eq!(enc, Encoding::Utf16Be);
///
/// let mut bytes = Vec::new();
/// enc.encode("hi", &mut bytes).unwrap();
/// assert_eq!(bytes, [0, b'h', 0, b'i']);
/// assert_eq!(enc.decode(&bytes).unwrap(), "hi");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Encoding {
    /// 7-bit US-ASCII.
    Ascii,
    /// UTF-8.
    #[default]
    Utf8,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-32, little-endian.
    Utf32Le,
    /// UTF-32, big-endian.
    Utf32Be,
}

/// A conversion between text and bytes failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{encoding}: {details}")]
pub struct CodecError {
    /// Canonical name of the encoding that failed.
    pub encoding: &'static str,
    /// What could not be converted.
    pub details: String,
}

impl Encoding {
    /// Look up an encoding by label, ignoring ASCII case and surrounding whitespace.
    ///
    /// `"utf-16"` and `"unicode"` mean little-endian UTF-16, `"utf-32"`
    /// means little-endian UTF-32.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if the label is empty or unknown
    pub fn from_label(label: &str) -> Result<Self, FsError> {
        let normalized = label.trim().to_ascii_lowercase();
        let encoding = match normalized.as_str() {
            "ascii" | "us-ascii" => Encoding::Ascii,
            "utf-8" | "utf8" => Encoding::Utf8,
            "utf-16" | "utf16" | "utf-16le" | "utf16le" | "unicode" => Encoding::Utf16Le,
            "utf-16be" | "utf16be" => Encoding::Utf16Be,
            "utf-32" | "utf32" | "utf-32le" | "utf32le" => Encoding::Utf32Le,
            "utf-32be" | "utf32be" => Encoding::Utf32Be,
            "" => return Err(FsError::invalid_argument("encoding", "no encoding given")),
            _ => {
                return Err(FsError::invalid_argument(
                    "encoding",
                    format!("unknown encoding label {label:?}"),
                ));
            }
        };
        Ok(encoding)
    }

    /// Canonical name of the encoding.
    pub const fn name(&self) -> &'static str {
        match self {
            Encoding::Ascii => "us-ascii",
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Utf32Le => "utf-32le",
            Encoding::Utf32Be => "utf-32be",
        }
    }

    /// Byte order mark written at the start of a file, if the encoding has one.
    pub const fn preamble(&self) -> &'static [u8] {
        match self {
            Encoding::Ascii => &[],
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
            Encoding::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
        }
    }

    /// Identify a byte order mark at the start of `bytes`.
    ///
    /// Returns the encoding it announces and the length of the mark.
    pub fn detect_bom(bytes: &[u8]) -> Option<(Encoding, usize)> {
        // UTF-32LE must be tested before UTF-16LE, its mark is a prefix.
        [
            Encoding::Utf32Le,
            Encoding::Utf32Be,
            Encoding::Utf8,
            Encoding::Utf16Le,
            Encoding::Utf16Be,
        ]
        .into_iter()
        .find(|enc| bytes.starts_with(enc.preamble()))
        .map(|enc| (enc, enc.preamble().len()))
    }

    /// Append the encoded form of `text` to `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if `text` contains a character the encoding
    /// cannot represent. `out` may hold a partial encoding in that case.
    pub fn encode(&self, text: &str, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match self {
            Encoding::Ascii => {
                if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
                    return Err(self.error(format!("character {c:?} is not representable")));
                }
                out.extend_from_slice(text.as_bytes());
            }
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Utf16Le => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_le_bytes())),
            Encoding::Utf16Be => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes())),
            Encoding::Utf32Le => text
                .chars()
                .for_each(|c| out.extend_from_slice(&u32::from(c).to_le_bytes())),
            Encoding::Utf32Be => text
                .chars()
                .for_each(|c| out.extend_from_slice(&u32::from(c).to_be_bytes())),
        }
        Ok(())
    }

    /// Decode `bytes` as a whole.
    ///
    /// A byte order mark is not stripped here; see [`Encoding::detect_bom`].
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on malformed or truncated input.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(at) => Err(self.error(format!("byte 0x{:02X} at offset {at}", bytes[at]))),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| self.error(e.to_string())),
            Encoding::Utf16Le => self.decode_utf16(bytes, u16::from_le_bytes),
            Encoding::Utf16Be => self.decode_utf16(bytes, u16::from_be_bytes),
            Encoding::Utf32Le => self.decode_utf32(bytes, u32::from_le_bytes),
            Encoding::Utf32Be => self.decode_utf32(bytes, u32::from_be_bytes),
        }
    }

    fn decode_utf16(&self, bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, CodecError> {
        if bytes.len() % 2 != 0 {
            return Err(self.error(format!("odd byte length {}", bytes.len())));
        }
        let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
        char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|e| self.error(e.to_string()))
    }

    fn decode_utf32(&self, bytes: &[u8], unit: fn([u8; 4]) -> u32) -> Result<String, CodecError> {
        if bytes.len() % 4 != 0 {
            return Err(self.error(format!("byte length {} is not a multiple of 4", bytes.len())));
        }
        bytes
            .chunks_exact(4)
            .map(|quad| {
                let value = unit([quad[0], quad[1], quad[2], quad[3]]);
                char::from_u32(value)
                    .ok_or_else(|| self.error(format!("invalid scalar value 0x{value:X}")))
            })
            .collect()
    }

    fn error(&self, details: String) -> CodecError {
        CodecError {
            encoding: self.name(),
            details,
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
