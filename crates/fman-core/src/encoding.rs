//! Character encodings for reading and creating text files

use crate::error::FmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF32_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// A Unicode form announced by a byte order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marked {
    Utf8,
    Utf16(ByteOrder),
    Utf32(ByteOrder),
}

/// Detect a leading byte order mark and return the form and the bytes after it.
/// UTF-32 marks are tested first since the little-endian one begins like UTF-16's.
fn sniff_bom(bytes: &[u8]) -> Option<(Marked, &[u8])> {
    let marks = [
        (UTF32_BOM, Marked::Utf32(ByteOrder::Little)),
        (UTF32_BE_BOM, Marked::Utf32(ByteOrder::Big)),
        (UTF8_BOM, Marked::Utf8),
        (UTF16_BOM, Marked::Utf16(ByteOrder::Little)),
        (UTF16_BE_BOM, Marked::Utf16(ByteOrder::Big)),
    ];
    marks
        .into_iter()
        .find_map(|(mark, form)| bytes.strip_prefix(mark).map(|rest| (form, rest)))
}

fn decode_utf16(bytes: &[u8], order: ByteOrder) -> String {
    let units = bytes.chunks_exact(2).map(|pair| match order {
        ByteOrder::Little => u16::from_le_bytes([pair[0], pair[1]]),
        ByteOrder::Big => u16::from_be_bytes([pair[0], pair[1]]),
    });
    let mut text: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 2 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

fn decode_utf32(bytes: &[u8], order: ByteOrder) -> String {
    let mut text: String = bytes
        .chunks_exact(4)
        .map(|quad| {
            let quad = [quad[0], quad[1], quad[2], quad[3]];
            let value = match order {
                ByteOrder::Little => u32::from_le_bytes(quad),
                ByteOrder::Big => u32::from_be_bytes(quad),
            };
            char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect();
    if bytes.len() % 4 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

/// A supported text encoding.
///
/// UTF-16 and UTF-32 are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16,
    Utf32,
    Ascii,
    Latin1,
}

impl TextEncoding {
    pub const ALL: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Utf32,
        TextEncoding::Ascii,
        TextEncoding::Utf16,
        TextEncoding::Latin1,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Utf32 => "utf-32",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    /// Decode `bytes` into text. Invalid sequences become U+FFFD
    /// (or `?` for ASCII).
    ///
    /// A leading byte order mark wins over `self`: the mark is dropped and
    /// the rest is decoded in the Unicode form it names.
    pub fn decode(self, bytes: &[u8]) -> String {
        if let Some((form, rest)) = sniff_bom(bytes) {
            return match form {
                Marked::Utf8 => String::from_utf8_lossy(rest).into_owned(),
                Marked::Utf16(order) => decode_utf16(rest, order),
                Marked::Utf32(order) => decode_utf32(rest, order),
            };
        }
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Utf16 => decode_utf16(bytes, ByteOrder::Little),
            TextEncoding::Utf32 => decode_utf32(bytes, ByteOrder::Little),
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '?' })
                .collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    /// Encode `text`. Characters the encoding cannot represent become `?`.
    /// UTF-16 and UTF-32 output starts with a byte order mark; UTF-8 does not.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16 => {
                let mut out = UTF16_BOM.to_vec();
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
            TextEncoding::Utf32 => {
                let mut out = UTF32_BOM.to_vec();
                for ch in text.chars() {
                    out.extend_from_slice(&u32::from(ch).to_le_bytes());
                }
                out
            }
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = FmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextEncoding::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| FmError::UnsupportedEncoding(s.to_string()))
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = FmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.name().to_string()
    }
}
