//! Pipeline ops and the fixed-capacity program
//!
//! Op arguments are borrowed from the profiles passed to a transform and
//! from locals of the transform call itself, so a [`Program`] never outlives
//! the call that compiled it.

use crate::error::{Error, Result};
use crate::icc::tags::{Clut, Curve};
use crate::math::{Matrix3x3, Matrix3x4};
use crate::transfer::{HlgishParams, PqishParams, SrgbishParams};

/// Largest program a transform can compile
pub const MAX_OPS: usize = 32;

/// In-memory pixel encodings understood by the load and store ops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    A8,
    G8,
    P4444,
    P565,
    P888,
    P8888,
    P1010102,
    P101010xXr,
    P161616Le,
    P16161616Le,
    P161616Be,
    P16161616Be,
    Hhh,
    Hhhh,
    Fff,
    Ffff,
}

/// Channel a curve op applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
    A,
    /// R, G and B with one shared curve
    Rgb,
}

impl Channel {
    /// Channel for curve index 0..=3
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::R,
            1 => Self::G,
            2 => Self::B,
            _ => Self::A,
        }
    }
}

/// A per-channel curve evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveOp<'a> {
    /// Pure power curve `x^g`
    Gamma(&'a SrgbishParams),
    /// Piecewise sRGB-ish curve
    Tf(&'a SrgbishParams),
    Pq(&'a PqishParams),
    Hlg(&'a HlgishParams),
    HlgInv(&'a HlgishParams),
    /// Sampled lookup table
    Table(&'a Curve<'a>),
}

impl CurveOp<'_> {
    /// True if both ops are the same family with byte-identical parameters
    ///
    /// Tables never compare equal.
    pub fn fuses_with(&self, other: &Self) -> bool {
        use bytemuck::bytes_of;
        match (self, other) {
            (Self::Gamma(a), Self::Gamma(b)) | (Self::Tf(a), Self::Tf(b)) => bytes_of(*a) == bytes_of(*b),
            (Self::Pq(a), Self::Pq(b)) => bytes_of(*a) == bytes_of(*b),
            (Self::Hlg(a), Self::Hlg(b)) | (Self::HlgInv(a), Self::HlgInv(b)) => {
                bytes_of(*a) == bytes_of(*b)
            }
            _ => false,
        }
    }
}

/// One pipeline step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op<'a> {
    Load(Packing),
    Store(Packing),
    SwapRb,
    /// Clamp all four channels to [0, 1]
    Clamp,
    /// `x ↦ 1 - x` on all four channels
    Invert,
    ForceOpaque,
    Premul,
    Unpremul,
    Matrix3x3(&'a Matrix3x3),
    Matrix3x4(&'a Matrix3x4),
    LabToXyz,
    XyzToLab,
    Curve(Channel, CurveOp<'a>),
    /// Device → PCS CLUT: inputs from r, g, b (and a), outputs to r, g, b
    ClutA2B(&'a Clut<'a>),
    /// PCS → device CLUT: inputs from r, g, b, outputs to r, g, b (and a)
    ClutB2A(&'a Clut<'a>),
}

/// A compiled op sequence
#[derive(Debug, Clone)]
pub struct Program<'a> {
    ops: [Op<'a>; MAX_OPS],
    len: usize,
}

impl Default for Program<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Program<'a> {
    pub fn new() -> Self {
        Self {
            ops: [Op::Clamp; MAX_OPS],
            len: 0,
        }
    }

    /// Append an op
    pub fn push(&mut self, op: Op<'a>) -> Result<()> {
        let slot = self.ops.get_mut(self.len).ok_or(Error::ProgramOverflow)?;
        *slot = op;
        self.len += 1;
        Ok(())
    }

    pub fn ops(&self) -> &[Op<'a>] {
        &self.ops[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
