//! Standard Illuminant White Points
//!
//! The ICC profile connection space is referenced to D50.

/// CIE D50 white point in XYZ (Y = 1), as used by ICC PCS
pub const D50: [f32; 3] = [0.96422, 1.0, 0.82521];

/// Profile header illuminant expected by the parser
pub const HEADER_D50: [f32; 3] = [0.9642, 1.0, 0.8249];

/// Maximum per-component deviation of a header illuminant from D50
pub const ILLUMINANT_TOLERANCE: f32 = 0.01;

/// Returns true if `xyz` is within [`ILLUMINANT_TOLERANCE`] of the header D50
pub fn is_d50_illuminant(xyz: [f32; 3]) -> bool {
    xyz.iter()
        .zip(HEADER_D50.iter())
        .all(|(v, d)| (v - d).abs() <= ILLUMINANT_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illuminant_tolerance() {
        assert!(is_d50_illuminant([0.9642, 1.0, 0.8249]));
        assert!(is_d50_illuminant([0.9700, 0.995, 0.8300]));
        assert!(!is_d50_illuminant([0.9505, 1.0, 1.089]));
    }
}
