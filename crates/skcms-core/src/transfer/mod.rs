//! Transfer functions
//!
//! A [`TransferFunction`] is one of four analytic families:
//!
//! - sRGB-ish: `c·x + f` for `x < d`, `(a·x + b)^g + e` otherwise
//! - PQ-ish: `(max(A + B·x^C, 0) / (D + E·x^C))^F`
//! - HLG-ish: `K·(x·R ≤ 1 ? (x·R)^G : e^((x - c)·a) + b)`
//! - HLG-inverse-ish: the algebraic inverse of HLG-ish
//!
//! All families are extended to negative inputs by odd symmetry.
//!
//! ICC profiles and other stored data use the seven-float
//! [`LegacyTransferFunction`] encoding, where a negative `g` is a kind tag and
//! the other six floats are that family's parameters. Conversion happens at
//! the boundary via [`LegacyTransferFunction::decode`] and
//! [`TransferFunction::to_legacy`].

pub mod fit;

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::math::fast::{exp, is_finite, ln, pow};

/// Tolerance used for breakpoint continuity and approximate-inverse checks
pub const INVERSE_TOLERANCE: f32 = 1.0 / 512.0;

/// Result of classifying a transfer function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum TfType {
    Invalid = 0,
    Srgbish = 1,
    Pqish = 2,
    Hlgish = 3,
    HlgInvish = 4,
}

impl TfType {
    /// The negative `g` value marking this kind in the legacy encoding
    #[inline]
    const fn marker(self) -> f32 {
        -((self as u32) as f32)
    }
}

/// Parameters of the piecewise sRGB-ish family
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct SrgbishParams {
    pub g: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl SrgbishParams {
    /// Finite parameters with `a, c, d, g ≥ 0` and `a·d + b ≥ 0`
    pub fn is_valid(&self) -> bool {
        let sum = self.a + self.b + self.c + self.d + self.e + self.f + self.g;
        if !is_finite(sum) {
            return false;
        }
        // Written as negated >= so that NaN fails every check.
        if !(self.a >= 0.0) || !(self.c >= 0.0) || !(self.d >= 0.0) || !(self.g >= 0.0) {
            return false;
        }
        self.a * self.d + self.b >= 0.0
    }

    /// Pure power curve `x^g` (no linear segment, no offsets)
    pub fn is_gamma(&self) -> bool {
        self.g > 0.0
            && self.a == 1.0
            && self.b == 0.0
            && self.c == 0.0
            && self.d == 0.0
            && self.e == 0.0
            && self.f == 0.0
    }

    /// Evaluate on a non-negative input
    #[inline]
    pub fn eval_positive(&self, x: f32) -> f32 {
        if x < self.d {
            self.c * x + self.f
        } else {
            pow(self.a * x + self.b, self.g) + self.e
        }
    }
}

/// Parameters `A..F` of the PQ-ish family
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct PqishParams {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl PqishParams {
    #[inline]
    pub fn eval_positive(&self, x: f32) -> f32 {
        let xc = pow(x, self.c);
        let num = self.a + self.b * xc;
        pow(if num > 0.0 { num } else { 0.0 } / (self.d + self.e * xc), self.f)
    }
}

/// Parameters of the HLG-ish and HLG-inverse-ish families
///
/// The scale factor is stored as `K - 1`, so an all-zero field means `K = 1`.
/// Profiles written before the scale factor existed rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct HlgishParams {
    pub r: f32,
    pub g: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub k_minus_1: f32,
}

impl HlgishParams {
    #[inline]
    pub fn k(&self) -> f32 {
        self.k_minus_1 + 1.0
    }

    #[inline]
    pub fn eval_positive(&self, x: f32) -> f32 {
        let xr = x * self.r;
        let v = if xr <= 1.0 {
            pow(xr, self.g)
        } else {
            exp((x - self.c) * self.a) + self.b
        };
        self.k() * v
    }

    #[inline]
    pub fn eval_inverse_positive(&self, x: f32) -> f32 {
        let x = x / self.k();
        if x <= 1.0 {
            self.r * pow(x, self.g)
        } else {
            self.a * ln(x - self.b) + self.c
        }
    }
}

/// A transfer function, tagged by family
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferFunction {
    Srgbish(SrgbishParams),
    Pqish(PqishParams),
    Hlgish(HlgishParams),
    HlgInvish(HlgishParams),
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline(always)]
fn odd_extend(x: f32, f: impl FnOnce(f32) -> f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    sign * f(sign * x)
}

impl TransferFunction {
    /// Build an sRGB-ish function from its seven parameters
    #[inline]
    pub const fn srgbish(g: f32, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self::Srgbish(SrgbishParams { g, a, b, c, d, e, f })
    }

    /// `x ↦ x`
    pub const IDENTITY: Self = Self::srgbish(1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// The sRGB decoding curve (encoded → linear)
    pub const SRGB: Self = Self::srgbish(
        2.4,
        (1.0 / 1.055) as f32,
        (0.055 / 1.055) as f32,
        (1.0 / 12.92) as f32,
        0.04045,
        0.0,
        0.0,
    );

    /// The sRGB encoding curve (linear → encoded)
    pub const SRGB_INVERSE: Self = Self::srgbish(
        0.416_666_657,
        1.137_283_325,
        -0.0,
        12.920_000_076,
        0.003_130_805,
        -0.054_969_788,
        -0.0,
    );

    /// Pure power curve `x^g`
    #[inline]
    pub const fn gamma(g: f32) -> Self {
        Self::srgbish(g, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// PQ-ish function from `A..F`
    #[inline]
    pub const fn pq(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self::Pqish(PqishParams { a, b, c, d, e, f })
    }

    /// HLG-ish function with unit scale
    #[inline]
    pub const fn hlg(r: f32, g: f32, a: f32, b: f32, c: f32) -> Self {
        Self::scaled_hlg(1.0, r, g, a, b, c)
    }

    /// HLG-ish function scaled by `k`
    #[inline]
    pub const fn scaled_hlg(k: f32, r: f32, g: f32, a: f32, b: f32, c: f32) -> Self {
        Self::Hlgish(HlgishParams {
            r,
            g,
            a,
            b,
            c,
            k_minus_1: k - 1.0,
        })
    }

    /// SMPTE ST 2084 (PQ) EOTF, normalized so that 1.0 maps to 1.0
    pub fn pq_standard() -> Self {
        Self::pq(
            -107.0 / 128.0,
            1.0,
            32.0 / 2523.0,
            2413.0 / 128.0,
            -2392.0 / 128.0,
            8192.0 / 1305.0,
        )
    }

    /// ARIB STD-B67 / BT.2100 HLG inverse OETF (encoded → scene-linear, peak 12)
    pub fn hlg_standard() -> Self {
        Self::hlg(2.0, 2.0, 1.0 / 0.178_832_77, 0.284_668_92, 0.559_910_73)
    }

    /// Classify the function
    ///
    /// sRGB-ish parameters that break the validity constraints classify as
    /// [`TfType::Invalid`].
    pub fn classify(&self) -> TfType {
        match self {
            Self::Srgbish(p) if p.is_valid() => TfType::Srgbish,
            Self::Srgbish(_) => TfType::Invalid,
            Self::Pqish(_) => TfType::Pqish,
            Self::Hlgish(_) => TfType::Hlgish,
            Self::HlgInvish(_) => TfType::HlgInvish,
        }
    }

    /// The sRGB-ish parameters, if this is a valid sRGB-ish function
    pub fn as_srgbish(&self) -> Option<&SrgbishParams> {
        match self {
            Self::Srgbish(p) if p.is_valid() => Some(p),
            _ => None,
        }
    }

    /// Evaluate at `x`. Invalid functions evaluate to 0.
    pub fn eval(&self, x: f32) -> f32 {
        match self {
            Self::Srgbish(p) if p.is_valid() => odd_extend(x, |x| p.eval_positive(x)),
            Self::Srgbish(_) => 0.0,
            Self::Pqish(p) => odd_extend(x, |x| p.eval_positive(x)),
            Self::Hlgish(p) => odd_extend(x, |x| p.eval_positive(x)),
            Self::HlgInvish(p) => odd_extend(x, |x| p.eval_inverse_positive(x)),
        }
    }

    /// Analytic inverse
    ///
    /// PQ and HLG families invert by parameter permutation. sRGB-ish
    /// functions must be continuous at their breakpoint (within 1/512), and
    /// the inverse is adjusted so that `inv(f(1)) == 1`.
    pub fn invert(&self) -> Result<Self> {
        match self {
            Self::Pqish(p) => Ok(Self::Pqish(PqishParams {
                a: -p.a,
                b: p.d,
                c: 1.0 / p.f,
                d: p.b,
                e: -p.e,
                f: 1.0 / p.c,
            })),
            Self::Hlgish(p) => Ok(Self::HlgInvish(invert_hlg_params(p))),
            Self::HlgInvish(p) => Ok(Self::Hlgish(invert_hlg_params(p))),
            Self::Srgbish(p) if p.is_valid() => invert_srgbish(self, p),
            Self::Srgbish(_) => Err(Error::NotInvertible),
        }
    }

    /// Encode into the seven-float legacy layout
    pub fn to_legacy(&self) -> LegacyTransferFunction {
        match *self {
            Self::Srgbish(p) => LegacyTransferFunction {
                g: p.g,
                a: p.a,
                b: p.b,
                c: p.c,
                d: p.d,
                e: p.e,
                f: p.f,
            },
            Self::Pqish(p) => LegacyTransferFunction::tagged(TfType::Pqish, [p.a, p.b, p.c, p.d, p.e, p.f]),
            Self::Hlgish(p) => {
                LegacyTransferFunction::tagged(TfType::Hlgish, [p.r, p.g, p.a, p.b, p.c, p.k_minus_1])
            }
            Self::HlgInvish(p) => {
                LegacyTransferFunction::tagged(TfType::HlgInvish, [p.r, p.g, p.a, p.b, p.c, p.k_minus_1])
            }
        }
    }

    /// Exact bitwise equality of the legacy encodings
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        let (a, b) = (self.to_legacy(), other.to_legacy());
        bytemuck::bytes_of(&a) == bytemuck::bytes_of(&b)
    }
}

fn invert_hlg_params(p: &HlgishParams) -> HlgishParams {
    HlgishParams {
        r: 1.0 / p.r,
        g: 1.0 / p.g,
        a: 1.0 / p.a,
        b: p.b,
        c: p.c,
        k_minus_1: p.k_minus_1,
    }
}

fn invert_srgbish(src: &TransferFunction, p: &SrgbishParams) -> Result<TransferFunction> {
    // The two pieces must meet at the breakpoint.
    let d_l = p.c * p.d + p.f;
    let d_r = pow(p.a * p.d + p.b, p.g) + p.e;
    if (d_l - d_r).abs() > INVERSE_TOLERANCE {
        return Err(Error::NotInvertible);
    }

    let mut inv = SrgbishParams {
        d: d_l,
        ..SrgbishParams::default()
    };

    // Linear segment.
    if inv.d > 0.0 {
        inv.c = 1.0 / p.c;
        inv.f = -p.f / p.c;
    }

    // Power segment, via k = a^-g.
    let k = pow(p.a, -p.g);
    inv.g = 1.0 / p.g;
    inv.a = k;
    inv.b = -k * p.e;
    inv.e = -p.b / p.a;

    if inv.a < 0.0 {
        return Err(Error::NotInvertible);
    }
    if inv.a * inv.d + inv.b < 0.0 {
        inv.b = -inv.a * inv.d;
    }
    if !inv.is_valid() {
        return Err(Error::NotInvertible);
    }

    // Pin inv(src(1)) to exactly 1 in whichever segment src(1) falls.
    let s = src.eval(1.0);
    if !is_finite(s) {
        return Err(Error::NotInvertible);
    }
    let sign = if s < 0.0 { -1.0 } else { 1.0 };
    let s = s * sign;
    if s < inv.d {
        inv.f = 1.0 - sign * inv.c * s;
    } else {
        inv.e = 1.0 - sign * pow(inv.a * s + inv.b, inv.g);
    }

    if inv.is_valid() {
        Ok(TransferFunction::Srgbish(inv))
    } else {
        Err(Error::NotInvertible)
    }
}

/// The seven-float legacy encoding of a transfer function
///
/// With `g ≥ 0` the floats are sRGB-ish parameters. A negative integer `g`
/// names a family (`-2` PQ-ish, `-3` HLG-ish, `-4` HLG-inverse-ish) and
/// `a..f` carry that family's six parameters in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct LegacyTransferFunction {
    pub g: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl LegacyTransferFunction {
    fn tagged(kind: TfType, p: [f32; 6]) -> Self {
        Self {
            g: kind.marker(),
            a: p[0],
            b: p[1],
            c: p[2],
            d: p[3],
            e: p[4],
            f: p[5],
        }
    }

    #[inline]
    fn params(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Classify the encoding. Total over every bit pattern.
    pub fn classify(&self) -> TfType {
        if self.g < 0.0 {
            // Tags are small negative integers; reject anything else.
            if self.g < -128.0 {
                return TfType::Invalid;
            }
            let tag = -(self.g as i32);
            if (-tag) as f32 != self.g {
                return TfType::Invalid;
            }
            return match tag {
                2 => TfType::Pqish,
                3 => TfType::Hlgish,
                4 => TfType::HlgInvish,
                _ => TfType::Invalid,
            };
        }

        let p = SrgbishParams {
            g: self.g,
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            f: self.f,
        };
        if p.is_valid() { TfType::Srgbish } else { TfType::Invalid }
    }

    /// Decode into a [`TransferFunction`], or `None` if the encoding is invalid
    pub fn decode(&self) -> Option<TransferFunction> {
        let [a, b, c, d, e, f] = self.params();
        match self.classify() {
            TfType::Invalid => None,
            TfType::Srgbish => Some(TransferFunction::srgbish(self.g, a, b, c, d, e, f)),
            TfType::Pqish => Some(TransferFunction::pq(a, b, c, d, e, f)),
            TfType::Hlgish => Some(TransferFunction::Hlgish(hlg_from(self.params()))),
            TfType::HlgInvish => Some(TransferFunction::HlgInvish(hlg_from(self.params()))),
        }
    }
}

fn hlg_from(p: [f32; 6]) -> HlgishParams {
    HlgishParams {
        r: p[0],
        g: p[1],
        a: p[2],
        b: p[3],
        c: p[4],
        k_minus_1: p[5],
    }
}

impl From<TransferFunction> for LegacyTransferFunction {
    fn from(tf: TransferFunction) -> Self {
        tf.to_legacy()
    }
}
