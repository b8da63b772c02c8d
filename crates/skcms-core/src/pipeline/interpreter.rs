//! Lane-generic program interpreter
//!
//! [`run`] executes a compiled program over `N` pixels at a time, holding
//! each channel in a `[f32; N]` register. Every backend runs this same code
//! at a different `N`, and no kernel depends on `N`, so all backends produce
//! bit-identical output for the same program and input.

use half::f16;

use crate::color::lab::{lab_to_xyz, xyz_to_lab};
use crate::icc::tags::Clut;
use crate::math::fast::{clamp01, pow};
use crate::math::interpolation::sample_clut;
use crate::math::{Matrix3x3, Matrix3x4};
use crate::pipeline::ops::{Channel, CurveOp, Op, Packing};

/// Widest lane count of any backend
pub(crate) const MAX_LANES: usize = 16;

/// Largest bytes-per-pixel of any pixel format
const MAX_BYTES_PER_PIXEL: usize = 16;

/// XR channels map [0, 1023] onto this range
const XR_MIN: f32 = -0.752_941;
const XR_MAX: f32 = 1.250_98;
const XR_RANGE: f32 = XR_MAX - XR_MIN;

#[derive(Clone, Copy)]
struct Pixels<const N: usize> {
    r: [f32; N],
    g: [f32; N],
    b: [f32; N],
    a: [f32; N],
}

impl<const N: usize> Pixels<N> {
    const ZERO: Self = Self {
        r: [0.0; N],
        g: [0.0; N],
        b: [0.0; N],
        a: [0.0; N],
    };

    #[inline(always)]
    fn rgb_mut(&mut self) -> [&mut [f32; N]; 3] {
        [&mut self.r, &mut self.g, &mut self.b]
    }

    #[inline(always)]
    fn rgba_mut(&mut self) -> [&mut [f32; N]; 4] {
        [&mut self.r, &mut self.g, &mut self.b, &mut self.a]
    }
}

#[inline(always)]
fn map<const N: usize>(v: &mut [f32; N], f: impl Fn(f32) -> f32) {
    for x in v.iter_mut() {
        *x = f(*x);
    }
}

/// Apply `f` to `|x|`, then restore the sign of `x`
#[inline(always)]
fn signed(x: f32, f: impl Fn(f32) -> f32) -> f32 {
    let sign = x.to_bits() & 0x8000_0000;
    let v = f(f32::from_bits(x.to_bits() ^ sign));
    f32::from_bits(v.to_bits() | sign)
}

#[inline(always)]
fn eval_curve(op: &CurveOp<'_>, x: f32) -> f32 {
    match op {
        CurveOp::Gamma(p) => signed(x, |v| pow(v, p.g)),
        CurveOp::Tf(p) => signed(x, |v| p.eval_positive(v)),
        CurveOp::Pq(p) => signed(x, |v| p.eval_positive(v)),
        CurveOp::Hlg(p) => signed(x, |v| p.eval_positive(v)),
        CurveOp::HlgInv(p) => signed(x, |v| p.eval_inverse_positive(v)),
        CurveOp::Table(curve) => curve.eval(x),
    }
}

#[inline(always)]
fn to_fixed(f: f32) -> u32 {
    (f + 0.5) as i32 as u32
}

#[inline(always)]
fn xr_field(v: u32) -> f32 {
    (v & 0x3ff) as f32 * (1.0 / 1023.0) * XR_RANGE + XR_MIN
}

#[inline(always)]
fn xr_fixed(x: f32) -> u32 {
    (((x - XR_MIN) / XR_RANGE * 1023.0 + 0.5) as i32).clamp(0, 1023) as u32
}

#[inline(always)]
fn u16_le(b: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([b[i], b[i + 1]])
}

#[inline(always)]
fn u16_be(b: &[u8], i: usize) -> u16 {
    u16::from_be_bytes([b[i], b[i + 1]])
}

#[inline(always)]
fn u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline(always)]
fn f16_le(b: &[u8], i: usize) -> f32 {
    f16::from_le_bytes([b[i], b[i + 1]]).to_f32()
}

#[inline(always)]
fn f32_le(b: &[u8], i: usize) -> f32 {
    f32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

fn load_pixel(packing: Packing, s: &[u8]) -> [f32; 4] {
    const U8: f32 = 1.0 / 255.0;
    const U16: f32 = 1.0 / 65535.0;
    match packing {
        Packing::A8 => [0.0, 0.0, 0.0, s[0] as f32 * U8],
        Packing::G8 => {
            let g = s[0] as f32 * U8;
            [g, g, g, 1.0]
        }
        Packing::P4444 => {
            let v = u16_le(s, 0) as u32;
            let q = |shift: u32| ((v >> shift) & 15) as f32 * (1.0 / 15.0);
            [q(12), q(8), q(4), q(0)]
        }
        Packing::P565 => {
            let v = u16_le(s, 0) as u32;
            [
                (v & 31) as f32 * (1.0 / 31.0),
                (v & (63 << 5)) as f32 * (1.0 / (63 << 5) as f32),
                (v & (31 << 11)) as f32 * (1.0 / (31 << 11) as f32),
                1.0,
            ]
        }
        Packing::P888 => [s[0] as f32 * U8, s[1] as f32 * U8, s[2] as f32 * U8, 1.0],
        Packing::P8888 => [
            s[0] as f32 * U8,
            s[1] as f32 * U8,
            s[2] as f32 * U8,
            s[3] as f32 * U8,
        ],
        Packing::P1010102 => {
            let v = u32_le(s);
            let q = |shift: u32| ((v >> shift) & 0x3ff) as f32 * (1.0 / 1023.0);
            [q(0), q(10), q(20), (v >> 30) as f32 * (1.0 / 3.0)]
        }
        Packing::P101010xXr => {
            let v = u32_le(s);
            [xr_field(v), xr_field(v >> 10), xr_field(v >> 20), 1.0]
        }
        Packing::P161616Le => [
            u16_le(s, 0) as f32 * U16,
            u16_le(s, 2) as f32 * U16,
            u16_le(s, 4) as f32 * U16,
            1.0,
        ],
        Packing::P16161616Le => [
            u16_le(s, 0) as f32 * U16,
            u16_le(s, 2) as f32 * U16,
            u16_le(s, 4) as f32 * U16,
            u16_le(s, 6) as f32 * U16,
        ],
        Packing::P161616Be => [
            u16_be(s, 0) as f32 * U16,
            u16_be(s, 2) as f32 * U16,
            u16_be(s, 4) as f32 * U16,
            1.0,
        ],
        Packing::P16161616Be => [
            u16_be(s, 0) as f32 * U16,
            u16_be(s, 2) as f32 * U16,
            u16_be(s, 4) as f32 * U16,
            u16_be(s, 6) as f32 * U16,
        ],
        Packing::Hhh => [f16_le(s, 0), f16_le(s, 2), f16_le(s, 4), 1.0],
        Packing::Hhhh => [f16_le(s, 0), f16_le(s, 2), f16_le(s, 4), f16_le(s, 6)],
        Packing::Fff => [f32_le(s, 0), f32_le(s, 4), f32_le(s, 8), 1.0],
        Packing::Ffff => [f32_le(s, 0), f32_le(s, 4), f32_le(s, 8), f32_le(s, 12)],
    }
}

fn store_pixel(packing: Packing, [r, g, b, a]: [f32; 4], d: &mut [u8]) {
    let u8_of = |x: f32| to_fixed(x * 255.0) as u8;
    let u16_of = |x: f32| to_fixed(x * 65535.0) as u16;
    match packing {
        Packing::A8 => d[0] = u8_of(a),
        Packing::G8 => d[0] = u8_of(g),
        Packing::P4444 => {
            let q = |x: f32| to_fixed(x * 15.0);
            let v = q(r) << 12 | q(g) << 8 | q(b) << 4 | q(a);
            d[..2].copy_from_slice(&(v as u16).to_le_bytes());
        }
        Packing::P565 => {
            let v = to_fixed(r * 31.0) | to_fixed(g * 63.0) << 5 | to_fixed(b * 31.0) << 11;
            d[..2].copy_from_slice(&(v as u16).to_le_bytes());
        }
        Packing::P888 => {
            d[0] = u8_of(r);
            d[1] = u8_of(g);
            d[2] = u8_of(b);
        }
        Packing::P8888 => {
            d[0] = u8_of(r);
            d[1] = u8_of(g);
            d[2] = u8_of(b);
            d[3] = u8_of(a);
        }
        Packing::P1010102 => {
            let q = |x: f32| to_fixed(x * 1023.0);
            let v = q(r) | q(g) << 10 | q(b) << 20 | to_fixed(a * 3.0) << 30;
            d[..4].copy_from_slice(&v.to_le_bytes());
        }
        Packing::P101010xXr => {
            let v = xr_fixed(r) | xr_fixed(g) << 10 | xr_fixed(b) << 20;
            d[..4].copy_from_slice(&v.to_le_bytes());
        }
        Packing::P161616Le | Packing::P16161616Le => {
            let channels = if packing == Packing::P161616Le { 3 } else { 4 };
            for (i, x) in [r, g, b, a].into_iter().take(channels).enumerate() {
                d[2 * i..2 * i + 2].copy_from_slice(&u16_of(x).to_le_bytes());
            }
        }
        Packing::P161616Be | Packing::P16161616Be => {
            let channels = if packing == Packing::P161616Be { 3 } else { 4 };
            for (i, x) in [r, g, b, a].into_iter().take(channels).enumerate() {
                d[2 * i..2 * i + 2].copy_from_slice(&u16_of(x).to_be_bytes());
            }
        }
        Packing::Hhh | Packing::Hhhh => {
            let channels = if packing == Packing::Hhh { 3 } else { 4 };
            for (i, x) in [r, g, b, a].into_iter().take(channels).enumerate() {
                d[2 * i..2 * i + 2].copy_from_slice(&f16::from_f32(x).to_le_bytes());
            }
        }
        Packing::Fff | Packing::Ffff => {
            let channels = if packing == Packing::Fff { 3 } else { 4 };
            for (i, x) in [r, g, b, a].into_iter().take(channels).enumerate() {
                d[4 * i..4 * i + 4].copy_from_slice(&x.to_le_bytes());
            }
        }
    }
}

#[inline(always)]
fn load<const N: usize>(packing: Packing, src: &[u8], px: &mut Pixels<N>) {
    let bpp = src.len() / N;
    for (i, s) in src.chunks_exact(bpp).enumerate() {
        let [r, g, b, a] = load_pixel(packing, s);
        px.r[i] = r;
        px.g[i] = g;
        px.b[i] = b;
        px.a[i] = a;
    }
}

#[inline(always)]
fn store<const N: usize>(packing: Packing, px: &Pixels<N>, dst: &mut [u8]) {
    let bpp = dst.len() / N;
    for (i, d) in dst.chunks_exact_mut(bpp).enumerate() {
        store_pixel(packing, [px.r[i], px.g[i], px.b[i], px.a[i]], d);
    }
}

#[inline(always)]
fn matrix_3x3<const N: usize>(m: &Matrix3x3, px: &mut Pixels<N>) {
    let m = &m.m;
    for i in 0..N {
        let (r, g, b) = (px.r[i], px.g[i], px.b[i]);
        px.r[i] = m[0][0] * r + m[0][1] * g + m[0][2] * b;
        px.g[i] = m[1][0] * r + m[1][1] * g + m[1][2] * b;
        px.b[i] = m[2][0] * r + m[2][1] * g + m[2][2] * b;
    }
}

#[inline(always)]
fn matrix_3x4<const N: usize>(m: &Matrix3x4, px: &mut Pixels<N>) {
    let m = &m.m;
    for i in 0..N {
        let (r, g, b) = (px.r[i], px.g[i], px.b[i]);
        px.r[i] = m[0][0] * r + m[0][1] * g + m[0][2] * b + m[0][3];
        px.g[i] = m[1][0] * r + m[1][1] * g + m[1][2] * b + m[1][3];
        px.b[i] = m[2][0] * r + m[2][1] * g + m[2][2] * b + m[2][3];
    }
}

#[inline(always)]
fn convert_lab<const N: usize>(px: &mut Pixels<N>, f: fn(f32, f32, f32) -> [f32; 3]) {
    for i in 0..N {
        [px.r[i], px.g[i], px.b[i]] = f(px.r[i], px.g[i], px.b[i]);
    }
}

#[inline(always)]
fn clut<const N: usize>(clut: &Clut<'_>, px: &mut Pixels<N>, a2b: bool) {
    for i in 0..N {
        let out = sample_clut(clut, [px.r[i], px.g[i], px.b[i], px.a[i]]);
        px.r[i] = out[0];
        px.g[i] = out[1];
        px.b[i] = out[2];
        if a2b && clut.input_channels == 4 {
            // CMYK sources are opaque once K is consumed.
            px.a[i] = 1.0;
        } else if !a2b && clut.output_channels == 4 {
            px.a[i] = out[3];
        }
    }
}

/// Run `ops` over exactly `N` pixels
#[inline(always)]
fn exec<const N: usize>(ops: &[Op<'_>], src: &[u8], dst: &mut [u8]) {
    let mut px = Pixels::<N>::ZERO;
    for op in ops {
        match op {
            Op::Load(packing) => load(*packing, src, &mut px),
            Op::Store(packing) => store(*packing, &px, dst),
            Op::SwapRb => std::mem::swap(&mut px.r, &mut px.b),
            Op::Clamp => {
                for ch in px.rgba_mut() {
                    map(ch, clamp01);
                }
            }
            Op::Invert => {
                for ch in px.rgba_mut() {
                    map(ch, |x| 1.0 - x);
                }
            }
            Op::ForceOpaque => px.a = [1.0; N],
            Op::Premul => {
                for i in 0..N {
                    px.r[i] *= px.a[i];
                    px.g[i] *= px.a[i];
                    px.b[i] *= px.a[i];
                }
            }
            Op::Unpremul => {
                for i in 0..N {
                    let scale = 1.0 / px.a[i];
                    let scale = if scale < f32::INFINITY { scale } else { 0.0 };
                    px.r[i] *= scale;
                    px.g[i] *= scale;
                    px.b[i] *= scale;
                }
            }
            Op::Matrix3x3(m) => matrix_3x3(m, &mut px),
            Op::Matrix3x4(m) => matrix_3x4(m, &mut px),
            Op::LabToXyz => convert_lab(&mut px, lab_to_xyz),
            Op::XyzToLab => convert_lab(&mut px, xyz_to_lab),
            Op::Curve(channel, curve) => match channel {
                Channel::R => map(&mut px.r, |x| eval_curve(curve, x)),
                Channel::G => map(&mut px.g, |x| eval_curve(curve, x)),
                Channel::B => map(&mut px.b, |x| eval_curve(curve, x)),
                Channel::A => map(&mut px.a, |x| eval_curve(curve, x)),
                Channel::Rgb => {
                    for ch in px.rgb_mut() {
                        map(ch, |x| eval_curve(curve, x));
                    }
                }
            },
            Op::ClutA2B(c) => clut(c, &mut px, true),
            Op::ClutB2A(c) => clut(c, &mut px, false),
        }
    }
}

/// Run `ops` over `n` pixels, `N` at a time
///
/// `src` of `None` transforms `dst` in place, in which case both formats
/// have `dst_bpp` bytes per pixel. A trailing partial batch runs through
/// zero-padded scratch buffers, so no lane ever touches memory past `n`.
#[inline(always)]
pub(crate) fn run<const N: usize>(
    ops: &[Op<'_>],
    src: Option<&[u8]>,
    dst: &mut [u8],
    n: usize,
    src_bpp: usize,
    dst_bpp: usize,
) {
    let mut tmp_src = [0u8; MAX_BYTES_PER_PIXEL * MAX_LANES];
    let mut tmp_dst = [0u8; MAX_BYTES_PER_PIXEL * MAX_LANES];

    let full = n - n % N;
    let mut i = 0;
    while i < full {
        let d = &mut dst[i * dst_bpp..(i + N) * dst_bpp];
        match src {
            Some(s) => exec::<N>(ops, &s[i * src_bpp..(i + N) * src_bpp], d),
            None => {
                let len = N * src_bpp;
                tmp_src[..len].copy_from_slice(&d[..len]);
                exec::<N>(ops, &tmp_src[..len], d);
            }
        }
        i += N;
    }

    let tail = n - full;
    if tail > 0 {
        tmp_src.fill(0);
        let s = match src {
            Some(s) => &s[full * src_bpp..n * src_bpp],
            None => &dst[full * dst_bpp..n * dst_bpp],
        };
        tmp_src[..tail * src_bpp].copy_from_slice(s);
        exec::<N>(ops, &tmp_src[..N * src_bpp], &mut tmp_dst[..N * dst_bpp]);
        dst[full * dst_bpp..n * dst_bpp].copy_from_slice(&tmp_dst[..tail * dst_bpp]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_one(ops: &[Op<'_>], src: &[u8], dst_bpp: usize) -> Vec<u8> {
        let mut dst = vec![0u8; dst_bpp];
        run::<1>(ops, Some(src), &mut dst, 1, src.len(), dst_bpp);
        dst
    }

    #[test]
    fn test_8888_to_565() {
        let ops = [Op::Load(Packing::P8888), Op::Clamp, Op::Store(Packing::P565)];
        let out = run_one(&ops, &[0xff, 0xff, 0x00, 0xff], 2);
        let v = u16::from_le_bytes([out[0], out[1]]);
        assert_eq!(v & 31, 31);
        assert_eq!((v >> 5) & 63, 63);
        assert_eq!(v >> 11, 0);
    }

    #[test]
    fn test_4444_channel_order() {
        let ops = [Op::Load(Packing::P4444), Op::Store(Packing::P8888)];
        let out = run_one(&ops, &0x1234u16.to_le_bytes(), 4);
        assert_eq!(out, [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_1010102_alpha() {
        let ops = [Op::Load(Packing::P1010102), Op::Store(Packing::P8888)];
        let v: u32 = 1023 | 2 << 30;
        let out = run_one(&ops, &v.to_le_bytes(), 4);
        assert_eq!(out, [255, 0, 0, 170]);
    }

    #[test]
    fn test_16_bit_byte_order() {
        let ops = [Op::Load(Packing::P161616Be), Op::Store(Packing::P161616Le)];
        let out = run_one(&ops, &[0x12, 0x34, 0x00, 0x01, 0xff, 0xfe], 6);
        assert_eq!(out, [0x34, 0x12, 0x01, 0x00, 0xfe, 0xff]);
    }

    #[test]
    fn test_half_float_passthrough() {
        let ops = [Op::Load(Packing::Hhhh), Op::Store(Packing::Ffff)];
        let mut src = Vec::new();
        for x in [0.5f32, -1.0, 2.0, 0.25] {
            src.extend_from_slice(&f16::from_f32(x).to_le_bytes());
        }
        let out = run_one(&ops, &src, 16);
        let floats: Vec<f32> = out.chunks_exact(4).map(|c| f32_le(c, 0)).collect();
        assert_eq!(floats, [0.5, -1.0, 2.0, 0.25]);
    }

    #[test]
    fn test_xr_saturates_on_store() {
        let ops = [Op::Load(Packing::Fff), Op::Store(Packing::P101010xXr)];
        let mut src = Vec::new();
        for x in [XR_MIN, 10.0f32, -10.0] {
            src.extend_from_slice(&x.to_le_bytes());
        }
        let v = u32_le(&run_one(&ops, &src, 4));
        assert_eq!(v & 0x3ff, 0);
        assert_eq!((v >> 10) & 0x3ff, 1023);
        assert_eq!((v >> 20) & 0x3ff, 0);
        assert_eq!(v >> 30, 0);
    }

    #[test]
    fn test_unpremul_zero_alpha() {
        let ops = [
            Op::Load(Packing::P8888),
            Op::Unpremul,
            Op::Store(Packing::P8888),
        ];
        assert_eq!(run_one(&ops, &[10, 20, 30, 0], 4), [0, 0, 0, 0]);
    }

    #[test]
    fn test_curve_preserves_sign() {
        let params = crate::transfer::SrgbishParams {
            g: 2.0,
            a: 1.0,
            ..Default::default()
        };
        let op = CurveOp::Gamma(&params);
        assert_eq!(eval_curve(&op, -0.5), -eval_curve(&op, 0.5));
    }

    #[test]
    fn test_wide_tail_matches_scalar() {
        let ops = [Op::Load(Packing::P888), Op::Invert, Op::Store(Packing::P888)];
        let src: Vec<u8> = (0..=255u8).cycle().take(3 * 21).collect();
        let mut scalar = vec![0u8; src.len()];
        let mut wide = vec![0u8; src.len()];
        run::<1>(&ops, Some(&src), &mut scalar, 21, 3, 3);
        run::<8>(&ops, Some(&src), &mut wide, 21, 3, 3);
        assert_eq!(scalar, wide);
        assert_eq!(scalar[0], 255);
    }

    #[test]
    fn test_in_place_matches_out_of_place() {
        let ops = [Op::Load(Packing::P8888), Op::SwapRb, Op::Store(Packing::P8888)];
        let src: Vec<u8> = (0..4 * 19).map(|i| i as u8).collect();
        let mut expected = vec![0u8; src.len()];
        run::<16>(&ops, Some(&src), &mut expected, 19, 4, 4);
        let mut buf = src.clone();
        run::<16>(&ops, None, &mut buf, 19, 4, 4);
        assert_eq!(buf, expected);
        assert_eq!(&buf[..4], [2, 1, 0, 3]);
    }
}
