//! XYZ and s15Fixed16 array tags
//!
//! See ICC.1:2022 Sections 10.31 (XYZType) and 10.22 (s15Fixed16ArrayType)

use super::IccTag;
use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, read_s15fixed16, read_xyz_number};
use crate::math::Matrix3x3;

fn wrong_type(tag: &IccTag<'_>) -> IccError {
    IccError::InvalidTagType {
        tag: tag.signature.0,
        type_sig: tag.type_sig.0,
    }
}

/// Decode a single XYZNumber from an `XYZ ` tag
pub fn read_xyz(tag: &IccTag<'_>) -> Result<[f32; 3], IccError> {
    if tag.type_sig != TypeSignature::XYZ {
        return Err(wrong_type(tag));
    }
    if tag.data.len() < 20 {
        return Err(IccError::CorruptedData("XYZ tag too small".to_string()));
    }
    read_xyz_number(tag.data, 8).ok_or_else(|| IccError::CorruptedData("XYZ tag too small".to_string()))
}

/// Build the device → XYZD50 matrix from the red, green and blue colorants
///
/// Each colorant becomes one column.
pub fn read_to_xyzd50(
    red: &IccTag<'_>,
    green: &IccTag<'_>,
    blue: &IccTag<'_>,
) -> Result<Matrix3x3, IccError> {
    let columns = [read_xyz(red)?, read_xyz(green)?, read_xyz(blue)?];
    let mut m = Matrix3x3::identity();
    for (c, column) in columns.iter().enumerate() {
        for (r, &v) in column.iter().enumerate() {
            m.m[r][c] = v;
        }
    }
    Ok(m)
}

/// Decode a 3x3 `sf32` tag (e.g. `chad`), row-major
pub fn read_sf32_matrix(tag: &IccTag<'_>) -> Result<Matrix3x3, IccError> {
    if tag.type_sig != TypeSignature::SF32 {
        return Err(wrong_type(tag));
    }
    if tag.data.len() < 44 {
        return Err(IccError::CorruptedData("sf32 matrix tag too small".to_string()));
    }
    let mut m = Matrix3x3::identity();
    for (i, v) in m.m.iter_mut().flatten().enumerate() {
        *v = read_s15fixed16(tag.data, 8 + 4 * i).unwrap_or(0.0);
    }
    Ok(m)
}
