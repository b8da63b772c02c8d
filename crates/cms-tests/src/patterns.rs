//! Test pattern generation
//!
//! Patterns are produced as `RGBA_ffff` pixels in [0, 1] and re-encoded into
//! other formats through the library itself, so every byte pattern used in
//! tests is a valid encoding of its format.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use skcms_core::{AlphaFormat, Backend, PixelFormat, transform_with_backend};

/// Test pattern types
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// Gray ramp with opaque alpha
    Grayscale,
    /// RGB color cube corners (8 colors)
    ColorCube,
    /// Independent channel ramps at coprime periods, alpha included
    Ramps,
    /// Random pixels with seed
    Random(u64),
}

/// Generate `count` pixels of `pattern` as `RGBA_ffff` bytes
pub fn generate_pattern(pattern: TestPattern, count: usize) -> Vec<u8> {
    let mut pixels = vec![[0f32; 4]; count];

    match pattern {
        TestPattern::Grayscale => {
            for (i, px) in pixels.iter_mut().enumerate() {
                let v = i as f32 / (count.max(2) - 1) as f32;
                *px = [v, v, v, 1.0];
            }
        }
        TestPattern::ColorCube => {
            for (i, px) in pixels.iter_mut().enumerate() {
                let c = i % 8;
                *px = [(c & 1) as f32, ((c >> 1) & 1) as f32, ((c >> 2) & 1) as f32, 1.0];
            }
        }
        TestPattern::Ramps => {
            for (i, px) in pixels.iter_mut().enumerate() {
                let ramp = |period: usize| (i % period) as f32 / (period - 1) as f32;
                *px = [ramp(7), ramp(11), ramp(13), ramp(5)];
            }
        }
        TestPattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for px in pixels.iter_mut() {
                *px = [rng.r#gen(), rng.r#gen(), rng.r#gen(), rng.r#gen()];
            }
        }
    }

    pixels.iter().flatten().flat_map(|v| v.to_le_bytes()).collect()
}

/// Re-encode `RGBA_ffff` bytes as `format`, without color conversion
pub fn encode_pattern(ffff: &[u8], format: PixelFormat) -> anyhow::Result<Vec<u8>> {
    let n = ffff.len() / PixelFormat::RgbaFfff.bytes_per_pixel();
    let mut out = vec![0u8; n * format.bytes_per_pixel()];
    let srgb = skcms_core::srgb_profile();
    transform_with_backend(
        Backend::Scalar,
        ffff,
        PixelFormat::RgbaFfff,
        AlphaFormat::Unpremul,
        Some(srgb),
        &mut out,
        format,
        AlphaFormat::Unpremul,
        Some(srgb),
        n,
    )?;
    Ok(out)
}
