//! Pixel transforms between profiles
//!
//! Each call compiles a short op program for the format/profile pair and
//! runs it on the host's best backend. Programs live on the stack and
//! borrow from the profiles, so nothing is cached between calls and
//! concurrent transforms share no state beyond the one-time CPU detection.
//!
//! When a transform fails, the destination contents are unspecified.

use crate::error::{Error, Result};
use crate::pipeline::compiler::{Destination, compile};
use crate::pixel::{AlphaFormat, PixelFormat};
use crate::profile::{IccProfile, srgb_profile};
use crate::simd::Backend;

/// Convert `npixels` pixels from `src` to `dst`
///
/// A missing profile means sRGB. Passing the same profile object on both
/// sides converts formats only, with no color conversion.
///
/// # Errors
///
/// - [`Error::TooManyPixels`] if either buffer would exceed `i32::MAX` bytes
/// - [`Error::BufferSize`] if a slice is shorter than `npixels` pixels
/// - [`Error::UnusableDestination`] / [`Error::UnusableSource`] if a profile
///   cannot play its role
///
/// `dst` is unspecified after a failure.
#[allow(clippy::too_many_arguments)]
pub fn transform(
    src: &[u8],
    src_format: PixelFormat,
    src_alpha: AlphaFormat,
    src_profile: Option<&IccProfile<'_>>,
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_alpha: AlphaFormat,
    dst_profile: Option<&IccProfile<'_>>,
    npixels: usize,
) -> Result<()> {
    transform_with_backend(
        Backend::detected(),
        src,
        src_format,
        src_alpha,
        src_profile,
        dst,
        dst_format,
        dst_alpha,
        dst_profile,
        npixels,
    )
}

/// [`transform`] on an explicit backend
///
/// Backends the host cannot run still work, compiled for the baseline
/// target, so this is usable for cross-checking.
#[allow(clippy::too_many_arguments)]
pub fn transform_with_backend(
    backend: Backend,
    src: &[u8],
    src_format: PixelFormat,
    src_alpha: AlphaFormat,
    src_profile: Option<&IccProfile<'_>>,
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_alpha: AlphaFormat,
    dst_profile: Option<&IccProfile<'_>>,
    npixels: usize,
) -> Result<()> {
    run_transform(
        backend,
        Some(src),
        src_format,
        src_alpha,
        src_profile,
        dst,
        dst_format,
        dst_alpha,
        dst_profile,
        npixels,
    )
}

/// Convert `npixels` pixels of `buf` in place
///
/// Both formats must have the same bytes per pixel, otherwise this fails
/// with [`Error::InPlaceSizeMismatch`]. `buf` is unspecified after a
/// failure.
#[allow(clippy::too_many_arguments)]
pub fn transform_in_place(
    buf: &mut [u8],
    src_format: PixelFormat,
    src_alpha: AlphaFormat,
    src_profile: Option<&IccProfile<'_>>,
    dst_format: PixelFormat,
    dst_alpha: AlphaFormat,
    dst_profile: Option<&IccProfile<'_>>,
    npixels: usize,
) -> Result<()> {
    run_transform(
        Backend::detected(),
        None,
        src_format,
        src_alpha,
        src_profile,
        buf,
        dst_format,
        dst_alpha,
        dst_profile,
        npixels,
    )
}

fn byte_len(npixels: usize, format: PixelFormat) -> Result<usize> {
    npixels
        .checked_mul(format.bytes_per_pixel())
        .filter(|&len| len <= i32::MAX as usize)
        .ok_or(Error::TooManyPixels { count: npixels })
}

#[allow(clippy::too_many_arguments)]
fn run_transform(
    backend: Backend,
    src: Option<&[u8]>,
    src_format: PixelFormat,
    src_alpha: AlphaFormat,
    src_profile: Option<&IccProfile<'_>>,
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_alpha: AlphaFormat,
    dst_profile: Option<&IccProfile<'_>>,
    npixels: usize,
) -> Result<()> {
    let src_bpp = src_format.bytes_per_pixel();
    let dst_bpp = dst_format.bytes_per_pixel();
    let src_len = byte_len(npixels, src_format)?;
    let dst_len = byte_len(npixels, dst_format)?;

    if src.is_none() && src_bpp != dst_bpp {
        return Err(Error::InPlaceSizeMismatch {
            src: src_bpp,
            dst: dst_bpp,
        });
    }
    let src_actual = src.map_or(dst.len(), <[u8]>::len);
    if src_actual < src_len {
        return Err(Error::BufferSize {
            expected: src_len,
            actual: src_actual,
        });
    }
    if dst.len() < dst_len {
        return Err(Error::BufferSize {
            expected: dst_len,
            actual: dst.len(),
        });
    }

    let src_profile = src_profile.unwrap_or(srgb_profile());
    let dst_profile = dst_profile.unwrap_or(srgb_profile());

    let destination = Destination::prepare(src_profile, dst_profile, dst_format)?;
    let program = compile(
        src_format,
        src_alpha,
        src_profile,
        dst_format,
        dst_alpha,
        &destination,
    )?;
    tracing::trace!(ops = program.len(), ?backend, "compiled transform");

    backend.run(program.ops(), src, dst, npixels, src_bpp, dst_bpp);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::xyzd50_profile;

    fn convert(
        src: &[u8],
        src_format: PixelFormat,
        dst_format: PixelFormat,
        dst_profile: Option<&IccProfile<'_>>,
    ) -> Vec<u8> {
        let n = src.len() / src_format.bytes_per_pixel();
        let mut dst = vec![0u8; n * dst_format.bytes_per_pixel()];
        transform(
            src,
            src_format,
            AlphaFormat::Unpremul,
            None,
            &mut dst,
            dst_format,
            AlphaFormat::Unpremul,
            dst_profile,
            n,
        )
        .unwrap();
        dst
    }

    #[test]
    fn test_rgba_to_565() {
        let dst = convert(&[0xff, 0xff, 0x00, 0xff], PixelFormat::Rgba8888, PixelFormat::Rgb565, None);
        let v = u16::from_le_bytes([dst[0], dst[1]]);
        assert_eq!((v & 31, (v >> 5) & 63, v >> 11), (31, 63, 0));
    }

    #[test]
    fn test_identity_8888() {
        let src: Vec<u8> = (0..=255).collect();
        assert_eq!(convert(&src, PixelFormat::Rgba8888, PixelFormat::Rgba8888, None), src);
    }

    #[test]
    fn test_bgra_swaps() {
        let dst = convert(&[1, 2, 3, 4], PixelFormat::Rgba8888, PixelFormat::Bgra8888, None);
        assert_eq!(dst, [3, 2, 1, 4]);
    }

    #[test]
    fn test_srgb_white_to_xyzd50() {
        let dst = convert(&[255, 255, 255], PixelFormat::Rgb888, PixelFormat::RgbFff, Some(xyzd50_profile()));
        let xyz: Vec<f32> = dst
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert!((xyz[0] - 0.9642).abs() < 0.002, "{xyz:?}");
        assert!((xyz[1] - 1.0).abs() < 0.002, "{xyz:?}");
        assert!((xyz[2] - 0.8249).abs() < 0.002, "{xyz:?}");
    }

    #[test]
    fn test_premul_round_trip() {
        let mut premul = [0u8; 4];
        transform(
            &[200, 100, 50, 128],
            PixelFormat::Rgba8888,
            AlphaFormat::Unpremul,
            None,
            &mut premul,
            PixelFormat::Rgba8888,
            AlphaFormat::PremulAsEncoded,
            None,
            1,
        )
        .unwrap();
        assert_eq!(premul, [100, 50, 25, 128]);
    }

    #[test]
    fn test_opaque_forces_alpha() {
        let dst = {
            let mut dst = [0u8; 4];
            transform(
                &[1, 2, 3, 4],
                PixelFormat::Rgba8888,
                AlphaFormat::Opaque,
                None,
                &mut dst,
                PixelFormat::Rgba8888,
                AlphaFormat::Unpremul,
                None,
                1,
            )
            .unwrap();
            dst
        };
        assert_eq!(dst, [1, 2, 3, 255]);
    }

    #[test]
    fn test_short_buffers() {
        let mut dst = [0u8; 3];
        let err = transform(
            &[0u8; 4],
            PixelFormat::Rgb888,
            AlphaFormat::Unpremul,
            None,
            &mut dst,
            PixelFormat::Rgb888,
            AlphaFormat::Unpremul,
            None,
            2,
        )
        .unwrap_err();
        assert_eq!(err, Error::BufferSize { expected: 6, actual: 4 });
    }

    #[test]
    fn test_too_many_pixels() {
        let mut dst = [0u8; 0];
        let err = transform(
            &[],
            PixelFormat::RgbaFfff,
            AlphaFormat::Unpremul,
            None,
            &mut dst,
            PixelFormat::A8,
            AlphaFormat::Unpremul,
            None,
            (i32::MAX as usize) / 16 + 1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::TooManyPixels { .. }));
    }

    #[test]
    fn test_in_place_requires_equal_sizes() {
        let mut buf = [0u8; 8];
        let err = transform_in_place(
            &mut buf,
            PixelFormat::Rgba8888,
            AlphaFormat::Unpremul,
            None,
            PixelFormat::Rgb888,
            AlphaFormat::Unpremul,
            None,
            2,
        )
        .unwrap_err();
        assert_eq!(err, Error::InPlaceSizeMismatch { src: 4, dst: 3 });

        transform_in_place(
            &mut buf,
            PixelFormat::Rgba8888,
            AlphaFormat::Unpremul,
            None,
            PixelFormat::Bgra8888,
            AlphaFormat::Unpremul,
            None,
            2,
        )
        .unwrap();
    }

    #[test]
    fn test_backends_agree() {
        let src: Vec<u8> = (0..3 * 37).map(|i| (i * 7) as u8).collect();
        let run = |backend| {
            let mut dst = vec![0u8; 37 * 16];
            transform_with_backend(
                backend,
                &src,
                PixelFormat::Rgb888,
                AlphaFormat::Unpremul,
                None,
                &mut dst,
                PixelFormat::RgbaFfff,
                AlphaFormat::Unpremul,
                Some(xyzd50_profile()),
                37,
            )
            .unwrap();
            dst
        };
        let expected = run(Backend::Scalar);
        for backend in [Backend::Hsw, Backend::Skx] {
            assert_eq!(run(backend), expected, "{backend:?}");
        }
    }
}
