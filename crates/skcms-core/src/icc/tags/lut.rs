//! LUT Tag Types
//!
//! Multi-stage device↔PCS pipelines. Four encodings decode into the same
//! two shapes, [`A2B`] and [`B2A`]:
//! - mft1 (Lut8Type): 8-bit curves and grid
//! - mft2 (Lut16Type): 16-bit curves and grid
//! - mAB (lutAToBType): v4 A-to-B transform
//! - mBA (lutBToAType): v4 B-to-A transform
//!
//! The mft matrix is ignored: it only applies to XYZ inputs, which A2B
//! tables never see in practice.
//!
//! | stage     | A2B                    | B2A                    |
//! |-----------|------------------------|------------------------|
//! | first     | A curves + CLUT (1-4)  | B curves (3)           |
//! | middle    | M curves + matrix      | matrix + M curves      |
//! | last      | B curves (3)           | CLUT + A curves (3-4)  |
//!
//! See ICC.1:2022 Sections 10.10-10.13

use crate::icc::error::IccError;
use crate::icc::tags::curves::{Curve, read_curves};
use crate::icc::types::{ColorSpaceSignature, TypeSignature, read_s15fixed16, read_u16, read_u32, read_u8};
use crate::math::Matrix3x4;

/// CLUT grid samples, borrowed from the profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grid<'a> {
    /// One byte per sample
    U8(&'a [u8]),
    /// Two big-endian bytes per sample
    U16(&'a [u8]),
}

/// An N-dimensional color lookup table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clut<'a> {
    /// Grid points per input axis (only the first `input_channels` are used)
    pub grid_points: [u8; 4],
    /// Number of input dimensions, 1-4
    pub input_channels: usize,
    /// Samples per grid point, 3 or 4
    pub output_channels: usize,
    pub data: Grid<'a>,
}

/// A CLUT together with the curve stage that always accompanies it
///
/// For A2B the curves feed the CLUT, one per input channel. For B2A they
/// follow it, one per output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClutStage<'a> {
    pub clut: Clut<'a>,
    pub curves: [Curve<'a>; 4],
}

/// Matrix stage with its three curves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixStage<'a> {
    pub curves: [Curve<'a>; 3],
    pub matrix: Matrix3x4,
}

/// Device → PCS pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct A2B<'a> {
    /// A curves then CLUT; `None` for 3-channel pipelines without a grid
    pub clut_stage: Option<ClutStage<'a>>,
    /// M curves then matrix
    pub matrix_stage: Option<MatrixStage<'a>>,
    /// B curves
    pub output_curves: [Curve<'a>; 3],
}

impl A2B<'_> {
    /// Device channel count (1-4)
    pub fn input_channels(&self) -> usize {
        self.clut_stage.map_or(3, |s| s.clut.input_channels)
    }

    fn canonicalize(&mut self) {
        if let Some(stage) = &mut self.clut_stage {
            let n = stage.clut.input_channels;
            stage.curves[..n].iter_mut().for_each(Curve::canonicalize_identity);
        }
        if let Some(stage) = &mut self.matrix_stage {
            stage.curves.iter_mut().for_each(Curve::canonicalize_identity);
        }
        self.output_curves.iter_mut().for_each(Curve::canonicalize_identity);
    }
}

/// PCS → device pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct B2A<'a> {
    /// B curves
    pub input_curves: [Curve<'a>; 3],
    /// Matrix then M curves
    pub matrix_stage: Option<MatrixStage<'a>>,
    /// CLUT then A curves; `None` for 3-channel pipelines without a grid
    pub clut_stage: Option<ClutStage<'a>>,
}

impl B2A<'_> {
    /// Device channel count (3 or 4)
    pub fn output_channels(&self) -> usize {
        self.clut_stage.map_or(3, |s| s.clut.output_channels)
    }

    fn canonicalize(&mut self) {
        self.input_curves.iter_mut().for_each(Curve::canonicalize_identity);
        if let Some(stage) = &mut self.matrix_stage {
            stage.curves.iter_mut().for_each(Curve::canonicalize_identity);
        }
        if let Some(stage) = &mut self.clut_stage {
            let n = stage.clut.output_channels;
            stage.curves[..n].iter_mut().for_each(Curve::canonicalize_identity);
        }
    }
}

/// Which direction a LUT tag is being decoded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    A2B,
    B2A,
}

fn corrupted(msg: &str) -> IccError {
    IccError::CorruptedData(msg.to_string())
}

/// Channel-count rules shared by the mft encodings
fn check_mft_channels(direction: Direction, inputs: u8, outputs: u8) -> Result<(), IccError> {
    let ok = match direction {
        Direction::A2B => outputs == 3 && (1..=4).contains(&inputs),
        Direction::B2A => inputs == 3 && (3..=4).contains(&outputs),
    };
    if ok {
        Ok(())
    } else {
        Err(corrupted("unsupported LUT channel counts"))
    }
}

/// Curves and grid of an mft1/mft2 tag
struct MftTables<'a> {
    input_curves: [Curve<'a>; 4],
    clut: Clut<'a>,
    output_curves: [Curve<'a>; 4],
}

fn table_curve(data: &[u8], byte_width: usize) -> Curve<'_> {
    if byte_width == 1 {
        Curve::Table8(data)
    } else {
        Curve::Table16(data)
    }
}

fn read_mft<'a>(tag: &'a [u8], direction: Direction) -> Result<MftTables<'a>, IccError> {
    let type_sig = read_u32(tag, 0).ok_or_else(|| corrupted("LUT tag too small"))?;
    let (fixed, byte_width, input_entries, output_entries) = match TypeSignature(type_sig) {
        TypeSignature::LUT8 => {
            if tag.len() < 48 {
                return Err(corrupted("mft1 tag too small"));
            }
            (48usize, 1usize, 256usize, 256usize)
        }
        TypeSignature::LUT16 => {
            if tag.len() < 52 {
                return Err(corrupted("mft2 tag too small"));
            }
            let input_entries = read_u16(tag, 48).unwrap_or(0) as usize;
            let output_entries = read_u16(tag, 50).unwrap_or(0) as usize;
            if !(2..=4096).contains(&input_entries) || !(2..=4096).contains(&output_entries) {
                return Err(corrupted("mft2 table entry count out of range"));
            }
            (52, 2, input_entries, output_entries)
        }
        _ => return Err(IccError::InvalidTagType { tag: 0, type_sig }),
    };

    let inputs = tag[8];
    let outputs = tag[9];
    let grid = tag[10];
    check_mft_channels(direction, inputs, outputs)?;
    if grid < 2 {
        return Err(corrupted("CLUT needs at least two grid points per axis"));
    }
    let (inputs, outputs) = (inputs as usize, outputs as usize);

    let mut grid_points = [0u8; 4];
    grid_points[..inputs].fill(grid);

    let input_len = input_entries * byte_width;
    let output_len = output_entries * byte_width;
    let all_inputs = inputs * input_len;
    let all_outputs = outputs * output_len;
    let grid_size = grid_points[..inputs]
        .iter()
        .fold((outputs * byte_width) as u64, |acc, &g| acc * g as u64);

    let tables = &tag[fixed..];
    if (tables.len() as u64) < all_inputs as u64 + grid_size + all_outputs as u64 {
        return Err(corrupted("LUT tables truncated"));
    }
    let grid_size = grid_size as usize;

    let mut input_curves = [Curve::default(); 4];
    for (i, curve) in input_curves[..inputs].iter_mut().enumerate() {
        *curve = table_curve(&tables[i * input_len..(i + 1) * input_len], byte_width);
    }

    let grid_bytes = &tables[all_inputs..all_inputs + grid_size];
    let data = if byte_width == 1 { Grid::U8(grid_bytes) } else { Grid::U16(grid_bytes) };

    let output_base = all_inputs + grid_size;
    let mut output_curves = [Curve::default(); 4];
    for (i, curve) in output_curves[..outputs].iter_mut().enumerate() {
        let start = output_base + i * output_len;
        *curve = table_curve(&tables[start..start + output_len], byte_width);
    }

    Ok(MftTables {
        input_curves,
        clut: Clut {
            grid_points,
            input_channels: inputs,
            output_channels: outputs,
            data,
        },
        output_curves,
    })
}

/// Offsets in an mAB/mBA header
struct LutOffsets {
    inputs: usize,
    outputs: usize,
    b: u32,
    matrix: u32,
    m: u32,
    clut: u32,
    a: u32,
}

fn read_lut_offsets(tag: &[u8]) -> Result<LutOffsets, IccError> {
    if tag.len() < 32 {
        return Err(corrupted("lutAToB/lutBToA tag too small"));
    }
    let field = |offset| read_u32(tag, offset).unwrap_or(0);
    Ok(LutOffsets {
        inputs: tag[8] as usize,
        outputs: tag[9] as usize,
        b: field(12),
        matrix: field(16),
        m: field(20),
        clut: field(24),
        a: field(28),
    })
}

/// Matrix stage at `matrix_offset`, with M curves at `m_offset`
fn read_matrix_stage<'a>(
    tag: &'a [u8],
    m_offset: u32,
    matrix_offset: u32,
    scale: f32,
) -> Result<MatrixStage<'a>, IccError> {
    let mut curves = [Curve::default(); 3];
    read_curves(tag, m_offset, &mut curves)?;

    if (tag.len() as u64) < matrix_offset as u64 + 48 {
        return Err(corrupted("LUT matrix truncated"));
    }
    let base = matrix_offset as usize;
    let value = |i: usize| read_s15fixed16(tag, base + 4 * i).unwrap_or(0.0) * scale;

    let mut matrix = Matrix3x4::identity();
    for (r, row) in matrix.m.iter_mut().enumerate() {
        for (c, v) in row[..3].iter_mut().enumerate() {
            *v = value(r * 3 + c);
        }
        row[3] = value(9 + r);
    }
    Ok(MatrixStage { curves, matrix })
}

/// CLUT header and grid at `clut_offset`
fn read_clut<'a>(
    tag: &'a [u8],
    clut_offset: u32,
    inputs: usize,
    outputs: usize,
) -> Result<Clut<'a>, IccError> {
    let base = clut_offset as u64;
    if (tag.len() as u64) < base + 20 {
        return Err(corrupted("CLUT header truncated"));
    }
    let base = base as usize;

    let mut grid_points = [0u8; 4];
    for (i, g) in grid_points[..inputs].iter_mut().enumerate() {
        *g = tag[base + i];
        if *g < 2 {
            return Err(corrupted("CLUT needs at least two grid points per axis"));
        }
    }

    let byte_width = read_u8(tag, base + 16).unwrap_or(0);
    if byte_width != 1 && byte_width != 2 {
        return Err(corrupted("CLUT byte width must be 1 or 2"));
    }

    let grid_size = grid_points[..inputs]
        .iter()
        .fold(outputs as u64 * byte_width as u64, |acc, &g| acc * g as u64);
    if (tag.len() as u64) < base as u64 + 20 + grid_size {
        return Err(corrupted("CLUT grid truncated"));
    }
    let bytes = &tag[base + 20..base + 20 + grid_size as usize];
    let data = if byte_width == 1 { Grid::U8(bytes) } else { Grid::U16(bytes) };

    Ok(Clut {
        grid_points,
        input_channels: inputs,
        output_channels: outputs,
        data,
    })
}

fn read_mab<'a>(tag: &'a [u8], pcs: ColorSpaceSignature) -> Result<A2B<'a>, IccError> {
    let lut = read_lut_offsets(tag)?;
    if lut.outputs != 3 || lut.inputs > 4 {
        return Err(corrupted("unsupported lutAToB channel counts"));
    }
    if lut.b == 0 {
        return Err(corrupted("lutAToB without B curves"));
    }

    let mut output_curves = [Curve::default(); 3];
    read_curves(tag, lut.b, &mut output_curves)?;

    let matrix_stage = if lut.m != 0 {
        if lut.matrix == 0 {
            return Err(corrupted("lutAToB M curves without matrix"));
        }
        // XYZ PCS values are u1Fixed15 encoded; rescale to 1.0 == 0x8000.
        let scale = if pcs == ColorSpaceSignature::XYZ { 65535.0 / 32768.0 } else { 1.0 };
        Some(read_matrix_stage(tag, lut.m, lut.matrix, scale)?)
    } else {
        if lut.matrix != 0 {
            return Err(corrupted("lutAToB matrix without M curves"));
        }
        None
    };

    let clut_stage = if lut.a != 0 {
        if lut.clut == 0 {
            return Err(corrupted("lutAToB A curves without CLUT"));
        }
        let mut curves = [Curve::default(); 4];
        read_curves(tag, lut.a, &mut curves[..lut.inputs])?;
        let clut = read_clut(tag, lut.clut, lut.inputs, lut.outputs)?;
        // A zero-input grid is validated but never sampled.
        (lut.inputs > 0).then_some(ClutStage { clut, curves })
    } else {
        if lut.clut != 0 {
            return Err(corrupted("lutAToB CLUT without A curves"));
        }
        if lut.inputs != lut.outputs {
            return Err(corrupted("lutAToB without CLUT must keep its channel count"));
        }
        None
    };

    Ok(A2B {
        clut_stage,
        matrix_stage,
        output_curves,
    })
}

fn read_mba<'a>(tag: &'a [u8], pcs: ColorSpaceSignature) -> Result<B2A<'a>, IccError> {
    let lut = read_lut_offsets(tag)?;
    if lut.inputs != 3 || !(3..=4).contains(&lut.outputs) {
        return Err(corrupted("unsupported lutBToA channel counts"));
    }
    if lut.b == 0 {
        return Err(corrupted("lutBToA without B curves"));
    }

    let mut input_curves = [Curve::default(); 3];
    read_curves(tag, lut.b, &mut input_curves)?;

    let matrix_stage = if lut.m != 0 {
        if lut.matrix == 0 {
            return Err(corrupted("lutBToA M curves without matrix"));
        }
        let scale = if pcs == ColorSpaceSignature::XYZ { 32768.0 / 65535.0 } else { 1.0 };
        Some(read_matrix_stage(tag, lut.m, lut.matrix, scale)?)
    } else {
        if lut.matrix != 0 {
            return Err(corrupted("lutBToA matrix without M curves"));
        }
        None
    };

    let clut_stage = if lut.a != 0 {
        if lut.clut == 0 {
            return Err(corrupted("lutBToA A curves without CLUT"));
        }
        let mut curves = [Curve::default(); 4];
        read_curves(tag, lut.a, &mut curves[..lut.outputs])?;
        let clut = read_clut(tag, lut.clut, lut.inputs, lut.outputs)?;
        Some(ClutStage { clut, curves })
    } else {
        if lut.clut != 0 {
            return Err(corrupted("lutBToA CLUT without A curves"));
        }
        if lut.inputs != lut.outputs {
            return Err(corrupted("lutBToA without CLUT must keep its channel count"));
        }
        None
    };

    Ok(B2A {
        input_curves,
        matrix_stage,
        clut_stage,
    })
}

/// Decode an A2B tag (mft1, mft2 or mAB)
pub fn read_a2b<'a>(tag: &'a [u8], pcs: ColorSpaceSignature) -> Result<A2B<'a>, IccError> {
    let type_sig = read_u32(tag, 0).ok_or_else(|| corrupted("A2B tag too small"))?;
    let mut a2b = match TypeSignature(type_sig) {
        TypeSignature::LUT8 | TypeSignature::LUT16 => {
            let mft = read_mft(tag, Direction::A2B)?;
            A2B {
                clut_stage: Some(ClutStage {
                    clut: mft.clut,
                    curves: mft.input_curves,
                }),
                matrix_stage: None,
                output_curves: [mft.output_curves[0], mft.output_curves[1], mft.output_curves[2]],
            }
        }
        TypeSignature::LUTA2B => read_mab(tag, pcs)?,
        _ => return Err(IccError::InvalidTagType { tag: 0, type_sig }),
    };
    a2b.canonicalize();
    Ok(a2b)
}

/// Decode a B2A tag (mft1, mft2 or mBA)
pub fn read_b2a<'a>(tag: &'a [u8], pcs: ColorSpaceSignature) -> Result<B2A<'a>, IccError> {
    let type_sig = read_u32(tag, 0).ok_or_else(|| corrupted("B2A tag too small"))?;
    let mut b2a = match TypeSignature(type_sig) {
        TypeSignature::LUT8 | TypeSignature::LUT16 => {
            let mft = read_mft(tag, Direction::B2A)?;
            B2A {
                input_curves: [mft.input_curves[0], mft.input_curves[1], mft.input_curves[2]],
                matrix_stage: None,
                clut_stage: Some(ClutStage {
                    clut: mft.clut,
                    curves: mft.output_curves,
                }),
            }
        }
        TypeSignature::LUTB2A => read_mba(tag, pcs)?,
        _ => return Err(IccError::InvalidTagType { tag: 0, type_sig }),
    };
    b2a.canonicalize();
    Ok(b2a)
}
