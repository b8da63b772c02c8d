//! Chromatic Adaptation Transforms
//!
//! Bradford adaptation to the D50 profile connection space, and construction
//! of RGB -> XYZD50 matrices from primaries and a white point.
//!
//! References:
//! - ICC.1:2022 Annex E
//! - Lindbloom: http://www.brucelindbloom.com/index.html?Eqn_ChromAdapt.html

use crate::color::white_point::D50;
use crate::error::{Error, Result};
use crate::math::{Matrix3x3, Vector3};

/// Bradford matrix: XYZ → LMS (cone response)
const BRADFORD_XYZ_TO_LMS: Matrix3x3 = Matrix3x3::new([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Bradford matrix: LMS → XYZ (inverse)
const BRADFORD_LMS_TO_XYZ: Matrix3x3 = Matrix3x3::new([
    [0.9869929, -0.1470543, 0.1599627],
    [0.4323053, 0.5183603, 0.0492912],
    [-0.0085287, 0.0400428, 0.9684867],
]);

fn in_unit_range(x: f32) -> bool {
    (0.0..=1.0).contains(&x)
}

/// Bradford adaptation matrix from the white point `(wx, wy)` to D50
///
/// Both chromaticity coordinates must lie in [0, 1].
pub fn adapt_to_xyzd50(wx: f32, wy: f32) -> Result<Matrix3x3> {
    if !in_unit_range(wx) || !in_unit_range(wy) {
        return Err(Error::InvalidChromaticity);
    }

    // White point chromaticity -> XYZ with Y = 1.
    let w_xyz = Vector3::new(wx / wy, 1.0, (1.0 - wx - wy) / wy);
    let d50 = Vector3::new(D50[0], D50[1], D50[2]);

    let src_cone = BRADFORD_XYZ_TO_LMS.multiply_vec(&w_xyz);
    let dst_cone = BRADFORD_XYZ_TO_LMS.multiply_vec(&d50);

    let scale = Matrix3x3::diagonal(
        dst_cone.v[0] / src_cone.v[0],
        dst_cone.v[1] / src_cone.v[1],
        dst_cone.v[2] / src_cone.v[2],
    );
    let m = scale.concat(&BRADFORD_XYZ_TO_LMS);
    Ok(BRADFORD_LMS_TO_XYZ.concat(&m))
}

/// RGB → XYZD50 matrix from red/green/blue primaries and a white point
///
/// All chromaticities must lie in [0, 1]; the primaries matrix must be
/// invertible.
#[allow(clippy::too_many_arguments)]
pub fn primaries_to_xyzd50(
    rx: f32,
    ry: f32,
    gx: f32,
    gy: f32,
    bx: f32,
    by: f32,
    wx: f32,
    wy: f32,
) -> Result<Matrix3x3> {
    if [rx, ry, gx, gy, bx, by, wx, wy].iter().any(|&c| !in_unit_range(c)) {
        return Err(Error::InvalidChromaticity);
    }

    // Primaries as XYZ columns, each with Y scaled to its chromaticity.
    let primaries = Matrix3x3::new([
        [rx, gx, bx],
        [ry, gy, by],
        [1.0 - rx - ry, 1.0 - gx - gy, 1.0 - bx - by],
    ]);
    let primaries_inv = primaries.invert()?;

    // Source white point chromaticity -> XYZ with Y = 1.
    let w_xyz = Vector3::new(wx / wy, 1.0, (1.0 - wx - wy) / wy);
    let xyz = primaries_inv.multiply_vec(&w_xyz);

    let to_xyz = primaries.concat(&Matrix3x3::diagonal(xyz.v[0], xyz.v[1], xyz.v[2]));
    let adapt = adapt_to_xyzd50(wx, wy)?;
    Ok(adapt.concat(&to_xyz))
}
