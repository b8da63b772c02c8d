//! Transform compilation
//!
//! A transform is compiled in two steps. [`Destination::prepare`] derives
//! the values the program borrows but no profile holds (inverse destination
//! curves, the fused gamut matrix, the gray-destination profile copy).
//! [`compile`] then emits ops in a fixed order:
//!
//! 1. load, sRGB decode, normalization clamp, channel swap
//! 2. CMYK inversion and source alpha handling
//! 3. source → XYZD50/Lab (A2B chain or TRC curves)
//! 4. PCS → destination (B2A chain, or gamut matrix and inverse curves)
//! 5. clamp, CMYK inversion, destination alpha handling, channel swap
//! 6. sRGB encode and store
//!
//! Steps 3 and 4 are skipped when source and destination are the same
//! profile object.

use crate::error::{Error, Result};
use crate::icc::tags::Curve;
use crate::icc::types::ColorSpaceSignature;
use crate::math::Matrix3x3;
use crate::pipeline::ops::{Channel, CurveOp, Op, Packing, Program};
use crate::pixel::{AlphaFormat, Layout, PixelFormat};
use crate::profile::IccProfile;
use crate::transfer::{SrgbishParams, TransferFunction};

const fn srgbish_params(tf: TransferFunction) -> SrgbishParams {
    match tf {
        TransferFunction::Srgbish(p) => p,
        _ => SrgbishParams {
            g: 1.0,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        },
    }
}

static SRGB_DECODE: SrgbishParams = srgbish_params(TransferFunction::SRGB);
static SRGB_ENCODE: SrgbishParams = srgbish_params(TransferFunction::SRGB_INVERSE);

/// Encoding into a matrix/TRC destination
#[derive(Debug, Clone, Copy)]
struct MatrixTrcEncode<'a> {
    /// Inverse destination TRCs, always parametric
    curves: [Curve<'a>; 3],
    /// Source gamut → destination gamut, absent when the two are bit-identical
    gamut: Option<Matrix3x3>,
}

/// The destination side of one transform
#[derive(Debug, Clone, Copy)]
pub(crate) struct Destination<'a> {
    profile: IccProfile<'a>,
    convert: bool,
    encode: Option<MatrixTrcEncode<'a>>,
}

impl<'a> Destination<'a> {
    /// Validate `dst` as a destination for `src` and derive its encoding
    ///
    /// Gray destinations stop at XYZD50 and encode luminance with the
    /// destination curve, so their gamut is replaced by the identity.
    pub fn prepare(src: &IccProfile<'a>, dst: &IccProfile<'a>, dst_format: PixelFormat) -> Result<Self> {
        let gray = dst_format.layout() == Layout::G8;
        let mut profile = *dst;
        if gray {
            profile.set_xyzd50(&Matrix3x3::identity());
        }

        let convert = gray || !std::ptr::eq(src, dst);
        if !convert {
            return Ok(Self {
                profile,
                convert,
                encode: None,
            });
        }

        let encode = if profile.b2a.is_some() {
            None
        } else {
            let matrix_trc = profile
                .matrix_trc_destination()
                .ok_or(Error::UnusableDestination)?;

            let to_xyz = if src.a2b.is_some() {
                Matrix3x3::identity()
            } else {
                src.to_xyzd50.ok_or(Error::UnusableSource)?
            };
            let dst_to_xyz = profile.to_xyzd50.unwrap_or_default();
            let gamut = (dst_to_xyz.as_bytes() != to_xyz.as_bytes())
                .then(|| matrix_trc.from_xyzd50.concat(&to_xyz));

            Some(MatrixTrcEncode {
                curves: matrix_trc.inverse.map(Curve::Parametric),
                gamut,
            })
        };

        Ok(Self {
            profile,
            convert,
            encode,
        })
    }
}

/// Op for one curve, or `None` when it is an identity or invalid
fn select_curve_op<'s>(curve: &'s Curve<'s>) -> Option<CurveOp<'s>> {
    match curve {
        Curve::Parametric(tf) => match tf {
            TransferFunction::Srgbish(p) if p.is_gamma() => (p.g != 1.0).then_some(CurveOp::Gamma(p)),
            TransferFunction::Srgbish(p) if p.is_valid() => Some(CurveOp::Tf(p)),
            TransferFunction::Srgbish(_) => None,
            TransferFunction::Pqish(p) => Some(CurveOp::Pq(p)),
            TransferFunction::Hlgish(p) => Some(CurveOp::Hlg(p)),
            TransferFunction::HlgInvish(p) => Some(CurveOp::HlgInv(p)),
        },
        Curve::Table8(_) | Curve::Table16(_) => Some(CurveOp::Table(curve)),
    }
}

/// Emit curve ops for up to four channels
///
/// Three identical R, G and B ops are fused into one RGB op as soon as the
/// third is seen, so R+G+B+A becomes RGB+A.
fn push_curve_ops<'s>(program: &mut Program<'s>, curves: &'s [Curve<'s>]) -> Result<()> {
    let mut selected: [Option<(Channel, CurveOp<'s>)>; 4] = [None; 4];
    let mut position = 0;
    for (index, curve) in curves.iter().enumerate().take(4) {
        if let Some(op) = select_curve_op(curve) {
            selected[position] = Some((Channel::from_index(index), op));
            position += 1;
        }

        if index == 2 && position == 3 {
            if let [Some((_, r)), Some((_, g)), Some((_, b)), _] = selected {
                if r.fuses_with(&g) && r.fuses_with(&b) {
                    selected[0] = Some((Channel::Rgb, r));
                    position = 1;
                }
            }
        }
    }

    for (channel, op) in selected[..position].iter().flatten() {
        program.push(Op::Curve(*channel, *op))?;
    }
    Ok(())
}

fn load_ops(program: &mut Program<'_>, format: PixelFormat) -> Result<()> {
    let packing = match format.layout() {
        Layout::A8 => Packing::A8,
        Layout::G8 => Packing::G8,
        Layout::P565 => Packing::P565,
        Layout::P4444 => Packing::P4444,
        Layout::P888 => Packing::P888,
        Layout::P8888 | Layout::P8888Srgb => Packing::P8888,
        Layout::P1010102 => Packing::P1010102,
        Layout::P101010xXr => Packing::P101010xXr,
        Layout::P161616Le => Packing::P161616Le,
        Layout::P16161616Le => Packing::P16161616Le,
        Layout::P161616Be => Packing::P161616Be,
        Layout::P16161616Be => Packing::P16161616Be,
        Layout::HhhNorm | Layout::Hhh => Packing::Hhh,
        Layout::HhhhNorm | Layout::Hhhh => Packing::Hhhh,
        Layout::Fff => Packing::Fff,
        Layout::Ffff => Packing::Ffff,
    };
    program.push(Op::Load(packing))?;

    match format.layout() {
        Layout::P8888Srgb => program.push(Op::Curve(Channel::Rgb, CurveOp::Tf(&SRGB_DECODE)))?,
        Layout::HhhNorm | Layout::HhhhNorm => program.push(Op::Clamp)?,
        _ => {}
    }
    if format.is_bgr() {
        program.push(Op::SwapRb)?;
    }
    Ok(())
}

fn store_ops(program: &mut Program<'_>, format: PixelFormat) -> Result<()> {
    if format.is_bgr() {
        program.push(Op::SwapRb)?;
    }
    let packing = match format.layout() {
        Layout::A8 => Packing::A8,
        Layout::G8 => Packing::G8,
        Layout::P565 => Packing::P565,
        Layout::P4444 => Packing::P4444,
        Layout::P888 => Packing::P888,
        Layout::P8888 => Packing::P8888,
        Layout::P8888Srgb => {
            program.push(Op::Curve(Channel::Rgb, CurveOp::Tf(&SRGB_ENCODE)))?;
            Packing::P8888
        }
        Layout::P1010102 => Packing::P1010102,
        Layout::P101010xXr => Packing::P101010xXr,
        Layout::P161616Le => Packing::P161616Le,
        Layout::P16161616Le => Packing::P16161616Le,
        Layout::P161616Be => Packing::P161616Be,
        Layout::P16161616Be => Packing::P16161616Be,
        Layout::HhhNorm | Layout::Hhh => Packing::Hhh,
        Layout::HhhhNorm | Layout::Hhhh => Packing::Hhhh,
        Layout::Fff => Packing::Fff,
        Layout::Ffff => Packing::Ffff,
    };
    program.push(Op::Store(packing))
}

/// Source device values → PCS (XYZD50, or Lab converted to XYZD50)
fn source_ops<'s>(program: &mut Program<'s>, src: &'s IccProfile<'s>) -> Result<()> {
    if let Some(a2b) = &src.a2b {
        if let Some(stage) = &a2b.clut_stage {
            push_curve_ops(program, &stage.curves[..stage.clut.input_channels])?;
            program.push(Op::Clamp)?;
            program.push(Op::ClutA2B(&stage.clut))?;
        }
        if let Some(stage) = &a2b.matrix_stage {
            push_curve_ops(program, &stage.curves)?;
            if !stage.matrix.is_identity() {
                program.push(Op::Matrix3x4(&stage.matrix))?;
            }
        }
        push_curve_ops(program, &a2b.output_curves)?;
        if src.pcs == ColorSpaceSignature::LAB {
            program.push(Op::LabToXyz)?;
        }
        Ok(())
    } else if let (Some(trc), Some(_)) = (&src.trc, &src.to_xyzd50) {
        push_curve_ops(program, trc)
    } else {
        Err(Error::UnusableSource)
    }
}

/// PCS → destination device values
fn destination_ops<'s>(
    program: &mut Program<'s>,
    src: &'s IccProfile<'s>,
    dst: &'s Destination<'s>,
) -> Result<()> {
    if let Some(b2a) = &dst.profile.b2a {
        if src.a2b.is_none() {
            let to_xyz = src.to_xyzd50.as_ref().ok_or(Error::UnusableSource)?;
            program.push(Op::Matrix3x3(to_xyz))?;
        }
        if dst.profile.pcs == ColorSpaceSignature::LAB {
            program.push(Op::XyzToLab)?;
        }
        push_curve_ops(program, &b2a.input_curves)?;
        if let Some(stage) = &b2a.matrix_stage {
            if !stage.matrix.is_identity() {
                program.push(Op::Matrix3x4(&stage.matrix))?;
            }
            push_curve_ops(program, &stage.curves)?;
        }
        if let Some(stage) = &b2a.clut_stage {
            program.push(Op::Clamp)?;
            program.push(Op::ClutB2A(&stage.clut))?;
            push_curve_ops(program, &stage.curves[..stage.clut.output_channels])?;
        }
        return Ok(());
    }

    let encode = dst.encode.as_ref().ok_or(Error::UnusableDestination)?;
    if let Some(gamut) = &encode.gamut {
        program.push(Op::Matrix3x3(gamut))?;
    }
    push_curve_ops(program, &encode.curves)
}

/// Compile the program converting `src_format`/`src` pixels to
/// `dst_format`/`dst` pixels
pub(crate) fn compile<'s>(
    src_format: PixelFormat,
    mut src_alpha: AlphaFormat,
    src: &'s IccProfile<'s>,
    dst_format: PixelFormat,
    mut dst_alpha: AlphaFormat,
    dst: &'s Destination<'s>,
) -> Result<Program<'s>> {
    let mut program = Program::new();
    load_ops(&mut program, src_format)?;

    if src.is_cmyk() {
        // CMYK is stored inverted, and its fourth channel is K rather than alpha.
        program.push(Op::Invert)?;
        src_alpha = AlphaFormat::Unpremul;
    }
    match src_alpha {
        AlphaFormat::Opaque => program.push(Op::ForceOpaque)?,
        AlphaFormat::PremulAsEncoded => program.push(Op::Unpremul)?,
        AlphaFormat::Unpremul => {}
    }

    if dst.convert {
        source_ops(&mut program, src)?;
        destination_ops(&mut program, src, dst)?;
    }

    // Clamp before premul so that color is bounded by alpha, not just by 1.
    if dst_format.clamps_on_store() {
        program.push(Op::Clamp)?;
    }
    if dst.profile.is_cmyk() {
        program.push(Op::Invert)?;
        dst_alpha = AlphaFormat::Unpremul;
    }
    match dst_alpha {
        AlphaFormat::Opaque => program.push(Op::ForceOpaque)?,
        AlphaFormat::PremulAsEncoded => program.push(Op::Premul)?,
        AlphaFormat::Unpremul => {}
    }

    store_ops(&mut program, dst_format)?;
    Ok(program)
}
