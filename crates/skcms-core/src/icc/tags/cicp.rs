//! Coding-independent code points (ITU-T H.273)
//!
//! See ICC.1:2022 Section 10.3

use super::IccTag;
use crate::icc::error::IccError;
use crate::icc::types::TypeSignature;

/// The four H.273 code points carried by a `cicp` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cicp {
    pub color_primaries: u8,
    pub transfer_characteristics: u8,
    pub matrix_coefficients: u8,
    pub video_full_range_flag: u8,
}

/// Decode a `cicp` tag
pub fn read_cicp(tag: &IccTag<'_>) -> Result<Cicp, IccError> {
    if tag.type_sig != TypeSignature::CICP {
        return Err(IccError::InvalidTagType {
            tag: tag.signature.0,
            type_sig: tag.type_sig.0,
        });
    }
    match tag.data.get(8..12) {
        Some(&[color_primaries, transfer_characteristics, matrix_coefficients, video_full_range_flag]) => {
            Ok(Cicp {
                color_primaries,
                transfer_characteristics,
                matrix_coefficients,
                video_full_range_flag,
            })
        }
        _ => Err(IccError::CorruptedData("cicp tag too small".to_string())),
    }
}
