//! ICC Profile Error Types

use std::fmt;

/// Errors that can occur when parsing ICC profiles
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IccError {
    /// Profile data is too small
    TooSmall { expected: usize, actual: usize },
    /// Invalid profile signature (should be 'acsp')
    InvalidSignature(u32),
    /// Profile size in header doesn't fit the data
    SizeMismatch {
        header_size: u32,
        actual_size: usize,
    },
    /// Declared profile size cannot hold the header and tag table
    TagTableOverflow { tag_count: u32, profile_size: u32 },
    /// Unsupported profile version
    UnsupportedVersion { major: u8 },
    /// Header illuminant is not D50
    InvalidIlluminant,
    /// Tag offset is out of bounds
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: u32,
    },
    /// Invalid color space
    InvalidColorSpace(u32),
    /// Invalid tag type signature
    InvalidTagType { tag: u32, type_sig: u32 },
    /// Invalid rendering intent
    InvalidRenderingIntent(i32),
    /// Corrupted or invalid data
    CorruptedData(String),
    /// Neither A2B nor TRC+colorant tags describe the device → PCS mapping
    NotUsableAsSource,
}

impl fmt::Display for IccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { expected, actual } => {
                write!(
                    f,
                    "Profile too small: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidSignature(sig) => {
                write!(
                    f,
                    "Invalid profile signature: 0x{:08X} (expected 'acsp')",
                    sig
                )
            }
            Self::SizeMismatch {
                header_size,
                actual_size,
            } => {
                write!(
                    f,
                    "Size mismatch: header says {} bytes, data is {} bytes",
                    header_size, actual_size
                )
            }
            Self::TagTableOverflow {
                tag_count,
                profile_size,
            } => {
                write!(
                    f,
                    "Tag table of {} entries does not fit in {} bytes",
                    tag_count, profile_size
                )
            }
            Self::UnsupportedVersion { major } => {
                write!(f, "Unsupported profile version: {}", major)
            }
            Self::InvalidIlluminant => write!(f, "Header illuminant is not D50"),
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => {
                write!(
                    f,
                    "Tag '{:08X}' out of bounds: offset {} + size {} > profile size {}",
                    tag, offset, size, profile_size
                )
            }
            Self::InvalidColorSpace(cs) => {
                write!(f, "Invalid color space: 0x{:08X}", cs)
            }
            Self::InvalidTagType { tag, type_sig } => {
                write!(f, "Invalid type '{:08X}' for tag '{:08X}'", type_sig, tag)
            }
            Self::InvalidRenderingIntent(intent) => {
                write!(f, "Invalid rendering intent: {}", intent)
            }
            Self::CorruptedData(msg) => {
                write!(f, "Corrupted data: {}", msg)
            }
            Self::NotUsableAsSource => {
                write!(f, "Profile has neither A2B nor TRC and colorant tags")
            }
        }
    }
}

impl std::error::Error for IccError {}
