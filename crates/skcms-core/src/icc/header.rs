//! ICC Profile Header
//!
//! The header is 128 bytes, followed by the u32 tag count. Only the fields
//! the engine consumes are kept. See ICC.1:2022 Section 7.2.

use super::error::IccError;
use super::tags::{TAG_ENTRY_SIZE, TAG_TABLE_OFFSET};
use super::types::{ColorSpaceSignature, PROFILE_SIGNATURE, read_u32, read_xyz_number};
use crate::color::white_point::is_d50_illuminant;

/// Header plus tag count
pub const MIN_PROFILE_SIZE: usize = TAG_TABLE_OFFSET;

/// Highest supported major version
pub const MAX_MAJOR_VERSION: u8 = 4;

/// Validated header fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IccHeader {
    /// Declared profile size in bytes
    pub size: u32,
    /// Major version byte
    pub version_major: u8,
    /// Color space of device data
    pub data_color_space: ColorSpaceSignature,
    /// Profile connection space
    pub pcs: ColorSpaceSignature,
    /// PCS illuminant
    pub illuminant: [f32; 3],
    /// Number of tag table entries
    pub tag_count: u32,
}

impl IccHeader {
    /// Parse and validate the header of `data`
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < MIN_PROFILE_SIZE {
            return Err(IccError::TooSmall {
                expected: MIN_PROFILE_SIZE,
                actual: data.len(),
            });
        }
        let field = |offset| read_u32(data, offset).unwrap_or(0);

        let signature = field(36);
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(signature));
        }

        let size = field(0);
        if size as usize > data.len() {
            return Err(IccError::SizeMismatch {
                header_size: size,
                actual_size: data.len(),
            });
        }

        let tag_count = field(128);
        let table_end = MIN_PROFILE_SIZE as u64 + TAG_ENTRY_SIZE as u64 * tag_count as u64;
        if (size as u64) < table_end {
            return Err(IccError::TagTableOverflow {
                tag_count,
                profile_size: size,
            });
        }

        let version_major = data[8];
        if version_major > MAX_MAJOR_VERSION {
            return Err(IccError::UnsupportedVersion {
                major: version_major,
            });
        }

        let illuminant = read_xyz_number(data, 68).unwrap_or([0.0; 3]);
        if !is_d50_illuminant(illuminant) {
            return Err(IccError::InvalidIlluminant);
        }

        Ok(Self {
            size,
            version_major,
            data_color_space: ColorSpaceSignature(field(16)),
            pcs: ColorSpaceSignature(field(20)),
            illuminant,
            tag_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(size: u32, tag_count: u32) -> Vec<u8> {
        let mut data = vec![0u8; size.max(132) as usize];
        data[0..4].copy_from_slice(&size.to_be_bytes());
        data[8] = 4;
        data[16..20].copy_from_slice(b"RGB ");
        data[20..24].copy_from_slice(b"XYZ ");
        data[36..40].copy_from_slice(b"acsp");
        for (i, v) in [0x0000_f6d6i32, 0x0001_0000, 0x0000_d32d].iter().enumerate() {
            data[68 + 4 * i..72 + 4 * i].copy_from_slice(&v.to_be_bytes());
        }
        data[128..132].copy_from_slice(&tag_count.to_be_bytes());
        data
    }

    #[test]
    fn test_valid_header() {
        let h = IccHeader::parse(&header(132, 0)).unwrap();
        assert_eq!(h.size, 132);
        assert_eq!(h.data_color_space, ColorSpaceSignature::RGB);
        assert_eq!(h.pcs, ColorSpaceSignature::XYZ);
        assert_eq!(h.tag_count, 0);
    }

    #[test]
    fn test_too_small() {
        let data = header(132, 0);
        assert!(matches!(
            IccHeader::parse(&data[..131]),
            Err(IccError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_bad_signature() {
        let mut data = header(132, 0);
        data[36] = b'x';
        assert!(matches!(IccHeader::parse(&data), Err(IccError::InvalidSignature(_))));
    }

    #[test]
    fn test_declared_size_exceeds_data() {
        let mut data = header(132, 0);
        data[0..4].copy_from_slice(&200u32.to_be_bytes());
        assert!(matches!(IccHeader::parse(&data), Err(IccError::SizeMismatch { .. })));
    }

    #[test]
    fn test_tag_table_overflow() {
        let data = header(140, 1);
        assert!(matches!(
            IccHeader::parse(&data),
            Err(IccError::TagTableOverflow { .. })
        ));
        assert!(IccHeader::parse(&header(144, 1)).is_ok());
    }

    #[test]
    fn test_version_5_rejected() {
        let mut data = header(132, 0);
        data[8] = 5;
        assert!(matches!(
            IccHeader::parse(&data),
            Err(IccError::UnsupportedVersion { major: 5 })
        ));
    }

    #[test]
    fn test_non_d50_illuminant() {
        let mut data = header(132, 0);
        data[68..72].copy_from_slice(&0x0000_f351i32.to_be_bytes());
        assert!(matches!(IccHeader::parse(&data), Err(IccError::InvalidIlluminant)));
    }
}
