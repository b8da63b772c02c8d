//! CIELAB (L*a*b*) encodings of the profile connection space
//!
//! Lab PCS values travel through the pipeline in the ICC 8-bit-style
//! normalization: L/100, (a+128)/255, (b+128)/255, all in [0, 1].

use crate::math::fast::{fmax, pow};

/// D50 white used to scale XYZ in and out of Lab
const WHITE_X: f32 = 0.9642;
const WHITE_Z: f32 = 0.8249;

const EPSILON: f32 = 0.008856;
const KAPPA_SLOPE: f32 = 7.787;
const OFFSET: f32 = 16.0 / 116.0;

/// Normalized Lab → XYZD50
#[inline]
pub fn lab_to_xyz(r: f32, g: f32, b: f32) -> [f32; 3] {
    let l = r * 100.0;
    let a = g * 255.0 - 128.0;
    let bb = b * 255.0 - 128.0;

    let y = (l + 16.0) * (1.0 / 116.0);
    let x = y + a * 0.002;
    let z = y - bb * 0.005;

    let f_inv = |v: f32| {
        let v3 = v * v * v;
        if v3 > EPSILON { v3 } else { (v - OFFSET) * (1.0 / KAPPA_SLOPE) }
    };

    [f_inv(x) * WHITE_X, f_inv(y), f_inv(z) * WHITE_Z]
}

/// XYZD50 → normalized Lab
#[inline]
pub fn xyz_to_lab(r: f32, g: f32, b: f32) -> [f32; 3] {
    let f = |v: f32| {
        if v > EPSILON {
            pow(fmax(v, 0.0), 1.0 / 3.0)
        } else {
            v * KAPPA_SLOPE + OFFSET
        }
    };

    let x = f(r * (1.0 / WHITE_X));
    let y = f(g);
    let z = f(b * (1.0 / WHITE_Z));

    let l = y * 116.0 - 16.0;
    let a = (x - y) * 500.0;
    let bb = (y - z) * 200.0;

    [l * 0.01, (a + 128.0) * (1.0 / 255.0), (bb + 128.0) * (1.0 / 255.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_roundtrip() {
        let white = lab_to_xyz(1.0, 128.0 / 255.0, 128.0 / 255.0);
        assert!((white[0] - WHITE_X).abs() < 1e-4);
        assert!((white[1] - 1.0).abs() < 1e-4);
        assert!((white[2] - WHITE_Z).abs() < 1e-4);

        let lab = xyz_to_lab(white[0], white[1], white[2]);
        assert!((lab[0] - 1.0).abs() < 1e-2, "L = {}", lab[0]);
        assert!((lab[1] - 128.0 / 255.0).abs() < 1e-2);
        assert!((lab[2] - 128.0 / 255.0).abs() < 1e-2);
    }

    #[test]
    fn test_black() {
        let xyz = lab_to_xyz(0.0, 128.0 / 255.0, 128.0 / 255.0);
        for v in xyz {
            assert!(v.abs() < 1e-6, "black XYZ {:?}", xyz);
        }
    }
}
