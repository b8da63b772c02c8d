//! Parsed ICC profiles and the built-in profiles
//!
//! [`IccProfile`] borrows the bytes it was parsed from. Curve tables and CLUT
//! grids point into that buffer, so a profile cannot outlive it. Built-in
//! profiles borrow nothing and live for the whole process.

use crate::error::{Error, Result};
use crate::icc::tags::{self, A2B, B2A, Cicp, Curve, IccTag, read_sf32_matrix, read_xyz};
use crate::icc::types::{ColorSpaceSignature, TagSignature};
use crate::math::Matrix3x3;
use crate::pixel::{AlphaFormat, PixelFormat};
use crate::transfer::TransferFunction;
use crate::transfer::fit::{approximate_curve, are_approximate_inverses, max_roundtrip_error};
use crate::transform::transform;

/// A parsed ICC profile
///
/// A profile is usable as a transform source if it has an A2B pipeline, or
/// both TRC curves and a `to_xyzd50` matrix. It is usable as a destination
/// if it has a B2A pipeline, or parametric invertible TRCs and an invertible
/// `to_xyzd50` matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IccProfile<'a> {
    pub(crate) buffer: &'a [u8],
    /// Declared profile size
    pub size: u32,
    pub data_color_space: ColorSpaceSignature,
    /// Profile connection space, XYZ or Lab
    pub pcs: ColorSpaceSignature,
    pub tag_count: u32,
    /// Per-channel tone curves (gray profiles repeat `kTRC`)
    pub trc: Option<[Curve<'a>; 3]>,
    /// Device RGB → XYZD50 matrix
    pub to_xyzd50: Option<Matrix3x3>,
    pub a2b: Option<A2B<'a>>,
    pub b2a: Option<B2A<'a>>,
    pub cicp: Option<Cicp>,
}

const SRGB_TO_XYZD50: Matrix3x3 = Matrix3x3::new([
    [0.436_065_674, 0.385_147_095, 0.143_066_406],
    [0.222_488_403, 0.716_873_169, 0.060_607_910],
    [0.013_916_016, 0.097_076_416, 0.714_096_069],
]);

static SRGB_PROFILE: IccProfile<'static> = IccProfile {
    buffer: &[],
    size: 0,
    data_color_space: ColorSpaceSignature::RGB,
    pcs: ColorSpaceSignature::XYZ,
    tag_count: 0,
    trc: Some([Curve::Parametric(TransferFunction::SRGB); 3]),
    to_xyzd50: Some(SRGB_TO_XYZD50),
    a2b: None,
    b2a: None,
    cicp: None,
};

static XYZD50_PROFILE: IccProfile<'static> = IccProfile {
    buffer: &[],
    size: 0,
    data_color_space: ColorSpaceSignature::RGB,
    pcs: ColorSpaceSignature::XYZ,
    tag_count: 0,
    trc: Some([Curve::Parametric(TransferFunction::IDENTITY); 3]),
    to_xyzd50: Some(Matrix3x3::identity()),
    a2b: None,
    b2a: None,
    cicp: None,
};

static SRGB_TF: TransferFunction = TransferFunction::SRGB;
static SRGB_INVERSE_TF: TransferFunction = TransferFunction::SRGB_INVERSE;
static IDENTITY_TF: TransferFunction = TransferFunction::IDENTITY;

/// Canonical sRGB: the sRGB transfer function and its D50-adapted gamut
pub fn srgb_profile() -> &'static IccProfile<'static> {
    &SRGB_PROFILE
}

/// Linear XYZD50: identity curves and identity matrix
pub fn xyzd50_profile() -> &'static IccProfile<'static> {
    &XYZD50_PROFILE
}

pub fn srgb_transfer_function() -> &'static TransferFunction {
    &SRGB_TF
}

pub fn srgb_inverse_transfer_function() -> &'static TransferFunction {
    &SRGB_INVERSE_TF
}

pub fn identity_transfer_function() -> &'static TransferFunction {
    &IDENTITY_TF
}

/// Fixed probe pixels used by [`approximately_equal_profiles`]
///
/// A permutation of 0..=255 with four values removed, so it divides evenly
/// into 84 RGB or 63 RGBA pixels.
pub const PROBE_BYTES: [u8; 252] = [
    8, 179, 128, 204, 253, 38, 134, 184, 68, 102, 32, 138, 99, 39, 169, 215, 119, 26, 3, 223, 95,
    239, 52, 132, 114, 74, 81, 234, 97, 116, 244, 205, 30, 154, 173, 12, 51, 159, 122, 153, 61,
    226, 236, 178, 229, 55, 181, 220, 191, 194, 160, 126, 168, 82, 131, 18, 180, 245, 163, 22, 246,
    69, 235, 252, 57, 108, 14, 6, 152, 240, 255, 171, 242, 20, 227, 177, 238, 96, 85, 16, 211, 70,
    200, 149, 155, 146, 127, 145, 100, 151, 109, 19, 165, 208, 195, 164, 137, 254, 182, 248, 64,
    201, 45, 209, 5, 147, 207, 210, 113, 162, 83, 225, 9, 31, 15, 231, 115, 37, 58, 53, 24, 49,
    197, 56, 120, 172, 48, 21, 214, 129, 111, 11, 50, 187, 196, 34, 60, 103, 71, 144, 47, 203, 77,
    80, 232, 140, 222, 250, 206, 166, 247, 139, 249, 221, 72, 106, 27, 199, 117, 54, 219, 135, 118,
    40, 79, 41, 251, 46, 93, 212, 92, 233, 148, 28, 121, 63, 123, 158, 105, 59, 29, 42, 143, 23, 0,
    107, 176, 87, 104, 183, 156, 193, 189, 90, 188, 65, 190, 17, 198, 7, 186, 161, 1, 124, 78, 125,
    170, 133, 174, 218, 67, 157, 75, 101, 89, 217, 62, 33, 141, 228, 25, 35, 91, 230, 4, 2, 13, 73,
    86, 167, 237, 84, 243, 44, 185, 66, 130, 110, 150, 142, 216, 88, 112, 36, 224, 136, 202, 76,
    94, 98, 175, 213,
];

/// Inverse curves and XYZD50 → device matrix of a matrix/TRC destination
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatrixTrcDestination {
    pub inverse: [TransferFunction; 3],
    pub from_xyzd50: Matrix3x3,
}

impl<'a> IccProfile<'a> {
    /// The bytes this profile was parsed from (empty for built-ins)
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Tag table entry `index`
    pub fn tag_by_index(&self, index: u32) -> Option<IccTag<'a>> {
        tags::tag_at(self.buffer, self.tag_count, index)
    }

    /// First tag with `signature`
    pub fn tag_by_signature(&self, signature: TagSignature) -> Option<IccTag<'a>> {
        tags::find_tag(self.buffer, self.tag_count, signature)
    }

    /// Chromatic adaptation matrix from the `chad` tag
    pub fn chad(&self) -> Option<Matrix3x3> {
        self.tag_by_signature(TagSignature::CHAD)
            .and_then(|tag| read_sf32_matrix(&tag).ok())
    }

    /// Media white point from the `wtpt` tag
    pub fn wtpt(&self) -> Option<[f32; 3]> {
        self.tag_by_signature(TagSignature::MEDIA_WHITE)
            .and_then(|tag| read_xyz(&tag).ok())
    }

    pub fn is_cmyk(&self) -> bool {
        self.data_color_space == ColorSpaceSignature::CMYK
    }

    pub fn is_usable_as_source(&self) -> bool {
        self.a2b.is_some() || (self.trc.is_some() && self.to_xyzd50.is_some())
    }

    pub fn is_usable_as_destination(&self) -> bool {
        self.b2a.is_some() || self.matrix_trc_destination().is_some()
    }

    /// The inverted TRCs and gamut of a matrix/TRC destination
    ///
    /// `None` unless all three TRCs are parametric and invertible and
    /// `to_xyzd50` is invertible. Ignores any B2A pipeline.
    pub(crate) fn matrix_trc_destination(&self) -> Option<MatrixTrcDestination> {
        let trc = self.trc.as_ref()?;
        let to_xyzd50 = self.to_xyzd50.as_ref()?;
        let mut inverse = [TransferFunction::IDENTITY; 3];
        for (inv, curve) in inverse.iter_mut().zip(trc) {
            *inv = curve.parametric()?.invert().ok()?;
        }
        let from_xyzd50 = to_xyzd50.invert().ok()?;
        Some(MatrixTrcDestination {
            inverse,
            from_xyzd50,
        })
    }

    /// Replace all three TRCs with `tf`
    pub fn set_transfer_function(&mut self, tf: &TransferFunction) {
        self.trc = Some([Curve::Parametric(*tf); 3]);
    }

    /// Replace the device → XYZD50 matrix
    pub fn set_xyzd50(&mut self, to_xyzd50: &Matrix3x3) {
        self.to_xyzd50 = Some(*to_xyzd50);
    }

    /// True if `inv` is an approximate inverse of every TRC
    pub fn trcs_are_approximate_inverse(&self, inv: &TransferFunction) -> bool {
        self.trc
            .as_ref()
            .is_some_and(|trc| trc.iter().all(|curve| are_approximate_inverses(curve, inv)))
    }

    /// Rewrite the TRCs so the profile can be a transform destination
    ///
    /// Profiles with a B2A pipeline are left untouched. Otherwise each TRC is
    /// kept if it is already an invertible parametric curve, or replaced by
    /// its [`approximate_curve`] fit. On error the profile is unchanged.
    pub fn make_usable_as_destination(&mut self) -> Result<()> {
        if self.b2a.is_some() {
            return Ok(());
        }
        let (Some(trc), Some(to_xyzd50)) = (self.trc.as_ref(), self.to_xyzd50.as_ref()) else {
            return Err(Error::UnusableDestination);
        };
        to_xyzd50.invert()?;

        let mut tf = [TransferFunction::IDENTITY; 3];
        for (tf, curve) in tf.iter_mut().zip(trc) {
            *tf = match curve.parametric() {
                Some(p) if p.invert().is_ok() => *p,
                _ => approximate_curve(curve)?.0,
            };
        }
        self.trc = Some(tf.map(Curve::Parametric));
        Ok(())
    }

    /// Like [`make_usable_as_destination`](Self::make_usable_as_destination),
    /// but with one shared curve for all three channels
    ///
    /// Any B2A pipeline is dropped. Of the three fitted curves, the one whose
    /// inverse best round-trips all three original TRCs is kept.
    pub fn make_usable_as_destination_with_single_curve(&mut self) -> Result<()> {
        let mut result = *self;
        result.b2a = None;
        result.make_usable_as_destination()?;

        let (Some(original), Some(fitted)) = (self.trc.as_ref(), result.trc.as_ref()) else {
            return Err(Error::UnusableDestination);
        };

        let mut best = 0;
        let mut min_max_error = f32::INFINITY;
        for (i, curve) in fitted.iter().enumerate() {
            let inv = curve.parametric().ok_or(Error::UnusableDestination)?.invert()?;
            let err = original
                .iter()
                .map(|trc| max_roundtrip_error(trc, &inv))
                .fold(0.0f32, crate::math::fast::fmax);
            if min_max_error > err {
                min_max_error = err;
                best = i;
            }
        }

        result.trc = Some([fitted[best]; 3]);
        *self = result;
        Ok(())
    }
}

/// True if `a` and `b` map [`PROBE_BYTES`] to XYZD50 within one unit per byte
///
/// Profiles that are equal field by field compare equal without a transform.
/// A CMYK profile never equals a non-CMYK one.
pub fn approximately_equal_profiles(a: &IccProfile<'_>, b: &IccProfile<'_>) -> bool {
    if std::ptr::eq(a, b) || a == b {
        return true;
    }
    if a.is_cmyk() != b.is_cmyk() {
        return false;
    }

    let (format, npixels) = if a.is_cmyk() {
        (PixelFormat::Rgba8888, 63)
    } else {
        (PixelFormat::Rgb888, 84)
    };

    let mut dst_a = [0u8; 252];
    let mut dst_b = [0u8; 252];
    let len = npixels * PixelFormat::Rgb888.bytes_per_pixel();
    for (profile, dst) in [(a, &mut dst_a), (b, &mut dst_b)] {
        let converted = transform(
            &PROBE_BYTES,
            format,
            AlphaFormat::Unpremul,
            Some(profile),
            &mut dst[..len],
            PixelFormat::Rgb888,
            AlphaFormat::Unpremul,
            Some(xyzd50_profile()),
            npixels,
        );
        if converted.is_err() {
            return false;
        }
    }

    dst_a[..len]
        .iter()
        .zip(&dst_b[..len])
        .all(|(x, y)| x.abs_diff(*y) <= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_usable() {
        for p in [srgb_profile(), xyzd50_profile()] {
            assert!(p.is_usable_as_source());
            assert!(p.is_usable_as_destination());
            assert!(!p.is_cmyk());
            assert!(p.tag_by_index(0).is_none());
            assert!(p.chad().is_none());
        }
    }

    #[test]
    fn test_probe_bytes_are_distinct() {
        let mut seen = [false; 256];
        for &b in &PROBE_BYTES {
            assert!(!seen[b as usize], "duplicate probe byte {b}");
            seen[b as usize] = true;
        }
    }

    #[test]
    fn test_srgb_trcs_invert_srgb_inverse() {
        assert!(srgb_profile().trcs_are_approximate_inverse(srgb_inverse_transfer_function()));
        assert!(!srgb_profile().trcs_are_approximate_inverse(identity_transfer_function()));
    }

    #[test]
    fn test_setters() {
        let mut p = *srgb_profile();
        p.set_transfer_function(&TransferFunction::gamma(2.2));
        p.set_xyzd50(&Matrix3x3::identity());
        assert_eq!(p.trc.unwrap()[1], Curve::Parametric(TransferFunction::gamma(2.2)));
        assert_eq!(p.to_xyzd50, Some(Matrix3x3::identity()));
    }

    #[test]
    fn test_make_usable_needs_matrix() {
        let mut p = *srgb_profile();
        p.to_xyzd50 = None;
        assert_eq!(p.make_usable_as_destination(), Err(Error::UnusableDestination));

        let mut p = *srgb_profile();
        p.to_xyzd50 = Some(Matrix3x3::new([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]));
        assert!(p.make_usable_as_destination().is_err());
    }

    #[test]
    fn test_make_usable_fits_table_curves() {
        let table: Vec<u8> = (0..256u32)
            .flat_map(|i| {
                let v = TransferFunction::SRGB.eval(i as f32 / 255.0);
                ((v * 65535.0 + 0.5) as u16).to_be_bytes()
            })
            .collect();
        let mut p = *srgb_profile();
        p.trc = Some([Curve::Table16(&table); 3]);
        assert!(!p.is_usable_as_destination());

        let mut single = p;
        p.make_usable_as_destination().unwrap();
        assert!(p.is_usable_as_destination());

        single.make_usable_as_destination_with_single_curve().unwrap();
        let trc = single.trc.unwrap();
        assert_eq!(trc[0], trc[1]);
        assert_eq!(trc[1], trc[2]);
    }

    #[test]
    fn test_approximately_equal_builtins() {
        assert!(approximately_equal_profiles(srgb_profile(), srgb_profile()));
        assert!(!approximately_equal_profiles(srgb_profile(), xyzd50_profile()));

        let mut close = *srgb_profile();
        close.set_transfer_function(&TransferFunction::srgbish(
            2.4,
            1.0 / 1.055,
            0.055 / 1.055,
            1.0 / 12.92,
            0.04046,
            0.0,
            0.0,
        ));
        assert!(approximately_equal_profiles(srgb_profile(), &close));
    }
}
