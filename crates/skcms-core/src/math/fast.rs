//! Portable transcendental kernel
//!
//! Branch-light approximations of `log2`, `exp2` and `pow` built from the
//! IEEE-754 bit layout. They never call into the platform libm, so curve math
//! gives the same answer on every target and in every pipeline backend.
//!
//! Accuracy is well inside the 1/512 tolerance used by curve fitting.

/// Returns true when `x` is neither infinite nor NaN.
///
/// `x * 0.0` is `0.0` for finite inputs and NaN otherwise.
#[inline(always)]
pub fn is_finite(x: f32) -> bool {
    x * 0.0 == 0.0
}

/// `x > y ? x : y`, keeping the NaN behaviour of the comparison.
#[inline(always)]
pub fn fmax(x: f32, y: f32) -> f32 {
    if x > y { x } else { y }
}

/// `x < y ? x : y`, keeping the NaN behaviour of the comparison.
#[inline(always)]
pub fn fmin(x: f32, y: f32) -> f32 {
    if x < y { x } else { y }
}

/// Clamp to [0, 1]. NaN maps to 1.
#[inline(always)]
pub fn clamp01(x: f32) -> f32 {
    fmax(0.0, fmin(x, 1.0))
}

/// The next float below `x` (for positive, normal `x`).
#[inline(always)]
pub fn minus_1_ulp(x: f32) -> f32 {
    f32::from_bits(x.to_bits().wrapping_sub(1))
}

/// Approximate base-2 logarithm. Only meaningful for `x > 0`.
#[inline]
pub fn log2(x: f32) -> f32 {
    // The exponent field read as an integer is roughly log2(x) scaled by 2^23.
    let bits = x.to_bits();
    let e = bits as f32 * (1.0 / (1u32 << 23) as f32);

    // Mantissa mapped into [0.5, 1).
    let m = f32::from_bits((bits & 0x007f_ffff) | 0x3f00_0000);

    e - 124.225_514_990 - 1.498_030_302 * m - 1.725_879_990 / (0.352_088_706_8 + m)
}

/// Approximate natural logarithm.
#[inline]
pub fn ln(x: f32) -> f32 {
    const LN2: f32 = 0.693_147_18;
    LN2 * log2(x)
}

/// Approximate `2^x`, clamping to 0 below -127 and +inf above 128.
#[inline]
pub fn exp2(x: f32) -> f32 {
    if x > 128.0 {
        return f32::INFINITY;
    }
    if x < -127.0 {
        return 0.0;
    }
    let fract = x - x.floor();

    let fbits = (1u32 << 23) as f32
        * (x + 121.274_057_500 - 1.490_129_070 * fract + 27.728_023_300 / (4.842_525_68 - fract));

    // Guard the float -> int conversion before reinterpreting as bits.
    if fbits >= i32::MAX as f32 {
        return f32::INFINITY;
    }
    if fbits < 0.0 {
        return 0.0;
    }

    f32::from_bits(fbits as i32 as u32)
}

/// Approximate `e^x`.
#[inline]
pub fn exp(x: f32) -> f32 {
    const LOG2_E: f32 = 1.442_695_040_888_963_4;
    exp2(LOG2_E * x)
}

/// Approximate `x^y` for `x >= 0`.
///
/// `x == 0` and `x == 1` are returned exactly so curve endpoints stay exact.
#[inline]
pub fn pow(x: f32, y: f32) -> f32 {
    if x == 0.0 || x == 1.0 {
        return x;
    }
    exp2(log2(x) * y)
}
