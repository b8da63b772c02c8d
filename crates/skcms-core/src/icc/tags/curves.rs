//! Curve Tag Types
//!
//! ICC profiles use curves for tone reproduction (TRC) and for the curve
//! stages of A2B/B2A pipelines. Two tag types:
//! - curv: identity, u8Fixed8 gamma, or a u16 lookup table
//! - para: one of the five ICC parametric function types
//!
//! Tables are borrowed straight from the profile bytes; nothing is copied.
//!
//! See ICC.1:2022 Sections 10.6 (curv) and 10.18 (para)

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, read_s15fixed16, read_u16, read_u32};
use crate::math::fast::{clamp01, minus_1_ulp};
use crate::transfer::TransferFunction;
use crate::transfer::fit::fit_linear;

/// A tone curve: either an analytic transfer function or a lookup table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve<'a> {
    /// Analytic transfer function
    Parametric(TransferFunction),
    /// 8-bit table, one byte per entry (at least two entries)
    Table8(&'a [u8]),
    /// 16-bit big-endian table, two bytes per entry (at least two entries)
    Table16(&'a [u8]),
}

impl Default for Curve<'_> {
    fn default() -> Self {
        Curve::Parametric(TransferFunction::IDENTITY)
    }
}

impl<'a> Curve<'a> {
    /// Number of table entries, or 0 for parametric curves
    #[inline]
    pub fn table_entries(&self) -> usize {
        match self {
            Curve::Parametric(_) => 0,
            Curve::Table8(t) => t.len(),
            Curve::Table16(t) => t.len() / 2,
        }
    }

    /// The transfer function, if this curve is parametric
    #[inline]
    pub fn parametric(&self) -> Option<&TransferFunction> {
        match self {
            Curve::Parametric(tf) => Some(tf),
            _ => None,
        }
    }

    #[inline]
    fn table_value(&self, i: usize) -> f32 {
        match self {
            Curve::Parametric(_) => 0.0,
            Curve::Table8(t) => t[i] as f32 * (1.0 / 255.0),
            Curve::Table16(t) => {
                u16::from_be_bytes([t[2 * i], t[2 * i + 1]]) as f32 * (1.0 / 65535.0)
            }
        }
    }

    /// Evaluate at `x`
    ///
    /// Tables clamp `x` to [0, 1] and interpolate linearly between entries.
    pub fn eval(&self, x: f32) -> f32 {
        if let Curve::Parametric(tf) = self {
            return tf.eval(x);
        }

        let last = self.table_entries().saturating_sub(1);
        let ix = clamp01(x) * last as f32;
        let lo = (ix as usize).min(last);
        let hi = (minus_1_ulp(ix + 1.0) as usize).min(last);
        let t = ix - lo as f32;

        let l = self.table_value(lo);
        let h = self.table_value(hi);
        l + (h - l) * t
    }

    /// Replace a table that is exactly the identity ramp with the analytic identity
    pub fn canonicalize_identity(&mut self) {
        let n = self.table_entries();
        if n == 0 || n > i32::MAX as usize {
            return;
        }
        let tol = 1.0 / (2 * n) as f32;
        let fit = fit_linear(self, n, tol, true);
        if fit.points == n && fit.c == 1.0 && fit.f == 0.0 {
            *self = Curve::Parametric(TransferFunction::IDENTITY);
        }
    }
}

/// Bytes used by each `para` function type's parameters, after the gamma
const PARA_CURVE_BYTES: [u32; 5] = [
    4,  // g
    12, // g a b
    16, // g a b c
    20, // g a b c d
    28, // g a b c d e f
];

fn corrupted(msg: &str) -> IccError {
    IccError::CorruptedData(msg.to_string())
}

/// Decode a `para` tag body. Returns the curve and the bytes it occupies.
fn read_para(data: &[u8]) -> Result<(Curve<'_>, u32), IccError> {
    let size = data.len();
    if size < 12 {
        return Err(corrupted("para tag too small"));
    }
    let function_type = read_u16(data, 8).ok_or_else(|| corrupted("para tag too small"))?;
    let curve_bytes = *PARA_CURVE_BYTES
        .get(function_type as usize)
        .ok_or_else(|| corrupted("unknown para function type"))?;
    let curve_size = 12 + curve_bytes;
    if size < curve_size as usize {
        return Err(corrupted("para parameters truncated"));
    }

    let param = |i: usize| read_s15fixed16(data, 12 + 4 * i).unwrap_or(0.0);

    let g = param(0);
    let (mut a, mut b, mut c, mut d, mut e, mut f) = (1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    match function_type {
        1 => {
            a = param(1);
            b = param(2);
            if a == 0.0 {
                return Err(corrupted("para type 1 with a = 0"));
            }
            d = -b / a;
        }
        2 => {
            a = param(1);
            b = param(2);
            e = param(3);
            if a == 0.0 {
                return Err(corrupted("para type 2 with a = 0"));
            }
            d = -b / a;
            f = e;
        }
        3 => {
            a = param(1);
            b = param(2);
            c = param(3);
            d = param(4);
        }
        4 => {
            a = param(1);
            b = param(2);
            c = param(3);
            d = param(4);
            e = param(5);
            f = param(6);
        }
        _ => {}
    }
    let tf = TransferFunction::srgbish(g, a, b, c, d, e, f);
    if tf.as_srgbish().is_none() {
        return Err(corrupted("para parameters are not a valid transfer function"));
    }
    Ok((Curve::Parametric(tf), curve_size))
}

/// Decode a `curv` tag body. Returns the curve and the bytes it occupies.
fn read_curv(data: &[u8]) -> Result<(Curve<'_>, u32), IccError> {
    let size = data.len() as u64;
    if size < 12 {
        return Err(corrupted("curv tag too small"));
    }
    let count = read_u32(data, 8).ok_or_else(|| corrupted("curv tag too small"))?;
    let curve_size = 12 + 2 * count as u64;
    if size < curve_size {
        return Err(corrupted("curv table truncated"));
    }
    let curve_size = u32::try_from(curve_size).map_err(|_| corrupted("curv table too large"))?;

    let curve = match count {
        0 => Curve::Parametric(TransferFunction::IDENTITY),
        1 => {
            let gamma = read_u16(data, 12).unwrap_or(0) as f32 * (1.0 / 256.0);
            Curve::Parametric(TransferFunction::gamma(gamma))
        }
        _ => Curve::Table16(&data[12..curve_size as usize]),
    };
    Ok((curve, curve_size))
}

/// Decode a `curv` or `para` curve at the start of `data`
///
/// `data` extends to the end of the enclosing tag. Returns the curve and the
/// number of bytes it occupies (before alignment padding).
pub fn read_curve(data: &[u8]) -> Result<(Curve<'_>, u32), IccError> {
    let type_sig = read_u32(data, 0).ok_or_else(|| corrupted("curve too small"))?;
    match TypeSignature(type_sig) {
        TypeSignature::PARA => read_para(data),
        TypeSignature::CURVE => read_curv(data),
        _ => Err(IccError::InvalidTagType { tag: 0, type_sig }),
    }
}

/// Decode consecutive, 4-byte aligned curves starting at `offset` in `tag`
pub fn read_curves<'a>(tag: &'a [u8], offset: u32, curves: &mut [Curve<'a>]) -> Result<(), IccError> {
    let size = tag.len() as u64;
    let mut offset = offset as u64;
    for curve in curves.iter_mut() {
        if offset > size {
            return Err(corrupted("curve offset past end of tag"));
        }
        let (c, curve_bytes) = read_curve(&tag[offset as usize..])?;
        *curve = c;

        if curve_bytes > u32::MAX - 3 {
            return Err(corrupted("curve too large"));
        }
        let padded = (curve_bytes + 3) & !3;
        offset += padded as u64;
        if offset > u32::MAX as u64 {
            return Err(corrupted("curve offsets overflow"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::TfType;

    fn curv_table(values: &[u16]) -> Vec<u8> {
        let mut data = b"curv\0\0\0\0".to_vec();
        data.extend_from_slice(&(values.len() as u32).to_be_bytes());
        for v in values {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data
    }

    fn para(function_type: u16, params: &[f32]) -> Vec<u8> {
        let mut data = b"para\0\0\0\0".to_vec();
        data.extend_from_slice(&function_type.to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        for p in params {
            data.extend_from_slice(&((p * 65536.0).round() as i32).to_be_bytes());
        }
        data
    }

    #[test]
    fn test_curv_identity_and_gamma() {
        let data = curv_table(&[]);
        let (c, size) = read_curve(&data).unwrap();
        assert_eq!(size, 12);
        assert_eq!(c, Curve::Parametric(TransferFunction::IDENTITY));

        let data = curv_table(&[0x0233]);
        let (c, size) = read_curve(&data).unwrap();
        assert_eq!(size, 14);
        let tf = c.parametric().unwrap().as_srgbish().unwrap();
        assert!((tf.g - 2.2).abs() < 0.01);
    }

    #[test]
    fn test_curv_table_eval() {
        let table = curv_table(&[0, 0x8000, 0xffff]);
        let (c, size) = read_curve(&table).unwrap();
        assert_eq!(size, 18);
        assert_eq!(c.table_entries(), 3);
        assert_eq!(c.eval(0.0), 0.0);
        assert_eq!(c.eval(1.0), 1.0);
        assert!((c.eval(0.25) - 0.25).abs() < 1e-4);
        // Out-of-range inputs clamp.
        assert_eq!(c.eval(-1.0), 0.0);
        assert_eq!(c.eval(7.0), 1.0);
        assert_eq!(c.eval(f32::NAN), 1.0);
    }

    #[test]
    fn test_curv_truncated() {
        let mut table = curv_table(&[0, 100, 200, 300]);
        table.truncate(table.len() - 1);
        assert!(read_curve(&table).is_err());
    }

    #[test]
    fn test_para_srgb() {
        let data = para(3, &[2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045]);
        let (c, size) = read_curve(&data).unwrap();
        assert_eq!(size, 32);
        let tf = c.parametric().unwrap();
        assert_eq!(tf.classify(), TfType::Srgbish);
        assert!((tf.eval(0.5) - TransferFunction::SRGB.eval(0.5)).abs() < 1e-4);
    }

    #[test]
    fn test_para_type1_derives_breakpoint() {
        let data = para(1, &[2.0, 2.0, -0.5]);
        let (c, _) = read_curve(&data).unwrap();
        let tf = *c.parametric().unwrap().as_srgbish().unwrap();
        assert_eq!(tf.d, 0.25);
        assert_eq!(tf.c, 0.0);
    }

    #[test]
    fn test_para_rejects_zero_a_and_bad_type() {
        assert!(read_curve(&para(1, &[2.0, 0.0, 0.0])).is_err());
        assert!(read_curve(&para(5, &[2.0; 7])).is_err());
        // Type 4 needs seven parameters.
        assert!(read_curve(&para(4, &[2.0, 1.0, 0.0])).is_err());
    }

    #[test]
    fn test_unknown_curve_type() {
        let data = b"XYZ \0\0\0\0\0\0\0\0".to_vec();
        assert!(matches!(
            read_curve(&data),
            Err(IccError::InvalidTagType { .. })
        ));
    }

    #[test]
    fn test_read_curves_alignment() {
        // A 3-entry table is 18 bytes, padded to 20.
        let mut tag = curv_table(&[0, 0x8000, 0xffff]);
        tag.extend_from_slice(&[0, 0]);
        tag.extend_from_slice(&curv_table(&[]));
        let mut curves = [Curve::default(); 2];
        read_curves(&tag, 0, &mut curves).unwrap();
        assert_eq!(curves[0].table_entries(), 3);
        assert_eq!(curves[1], Curve::Parametric(TransferFunction::IDENTITY));
    }

    #[test]
    fn test_canonicalize_identity_table() {
        let values: Vec<u16> = (0..256).map(|i| (i * 257) as u16).collect();
        let table = curv_table(&values);
        let (mut c, _) = read_curve(&table).unwrap();
        assert_eq!(c.table_entries(), 256);
        c.canonicalize_identity();
        assert_eq!(c, Curve::Parametric(TransferFunction::IDENTITY));

        let values: Vec<u16> = (0..256).map(|i| ((i * i) as u32 * 65535 / 65025) as u16).collect();
        let table = curv_table(&values);
        let (mut c, _) = read_curve(&table).unwrap();
        c.canonicalize_identity();
        assert_eq!(c.table_entries(), 256);
    }
}
