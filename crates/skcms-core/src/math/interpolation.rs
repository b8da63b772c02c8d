//! Multilinear CLUT interpolation
//!
//! One input axis is peeled per step: the two neighbouring grid slices
//! along the last axis are sampled recursively over the remaining axes,
//! then lerped. The last input axis varies fastest in memory, so the first
//! axis is interpolated first and the last one last.

use crate::icc::tags::{Clut, Grid};
use crate::math::fast::{clamp01, minus_1_ulp};

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grid_value(grid: &Grid<'_>, i: usize) -> f32 {
    match grid {
        Grid::U8(g) => g.get(i).map_or(0.0, |&v| v as f32 * (1.0 / 255.0)),
        Grid::U16(g) => g
            .get(2 * i..2 * i + 2)
            .map_or(0.0, |b| u16::from_be_bytes([b[0], b[1]]) as f32 * (1.0 / 65535.0)),
    }
}

/// Sample `clut` at `inputs` (only the first `input_channels` are read)
///
/// Inputs are clamped to [0, 1]. Returns the interpolated outputs; the
/// fourth is 0 for 3-output tables.
pub fn sample_clut(clut: &Clut<'_>, inputs: [f32; 4]) -> [f32; 4] {
    let dim = clut.input_channels.min(4);
    let channels = clut.output_channels.min(4);
    sample_axis(clut, &inputs, dim, channels, 0, 1)
}

/// Interpolate along axis `dim - 1` between two samples of the lower axes
fn sample_axis(
    clut: &Clut<'_>,
    inputs: &[f32; 4],
    dim: usize,
    channels: usize,
    ix: usize,
    stride: usize,
) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    if dim == 0 {
        for (c, o) in out[..channels].iter_mut().enumerate() {
            *o = grid_value(&clut.data, ix * channels + c);
        }
        return out;
    }

    let axis = dim - 1;
    let limit = clut.grid_points[axis] as usize;
    let x = clamp01(inputs[axis]) * limit.saturating_sub(1) as f32;
    let lo = x as usize;
    let hi = minus_1_ulp(x + 1.0) as usize;

    let low = sample_axis(clut, inputs, axis, channels, stride * lo + ix, stride * limit);
    let high = sample_axis(clut, inputs, axis, channels, stride * hi + ix, stride * limit);
    let t = x - lo as f32;
    for (o, (l, h)) in out[..channels].iter_mut().zip(low.iter().zip(&high)) {
        *o = lerp(*l, *h, t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2x2 grid whose outputs equal its inputs
    fn identity_grid() -> Vec<u8> {
        let mut g = Vec::new();
        for r in 0..2u8 {
            for gr in 0..2u8 {
                for b in 0..2u8 {
                    g.extend_from_slice(&[r * 255, gr * 255, b * 255]);
                }
            }
        }
        g
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_eq!(lerp(4.0, 4.0, 0.9), 4.0);
    }

    #[test]
    fn test_identity_grid_interpolates_inputs() {
        let data = identity_grid();
        let clut = Clut {
            grid_points: [2, 2, 2, 0],
            input_channels: 3,
            output_channels: 3,
            data: Grid::U8(&data),
        };
        for input in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.25, 0.5, 0.75], [0.9, 0.1, 0.3]] {
            let out = sample_clut(&clut, [input[0], input[1], input[2], 0.0]);
            for c in 0..3 {
                assert!((out[c] - input[c]).abs() < 1e-5, "{input:?} -> {out:?}");
            }
            assert_eq!(out[3], 0.0);
        }
    }

    #[test]
    fn test_last_axis_is_fastest() {
        // 1 input axis of 3 points, 3 outputs each, 16-bit.
        let values: [u16; 9] = [0, 0, 0, 65535, 0, 0, 65535, 65535, 65535];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let clut = Clut {
            grid_points: [3, 0, 0, 0],
            input_channels: 1,
            output_channels: 3,
            data: Grid::U16(&data),
        };
        let out = sample_clut(&clut, [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(&out[..3], &[1.0, 0.0, 0.0]);
        let out = sample_clut(&clut, [0.75, 0.0, 0.0, 0.0]);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_two_axes_with_different_grid_sizes() {
        // Axis 0 has 2 points, axis 1 has 3; axis 1 is contiguous.
        let mut data = Vec::new();
        for i0 in 0..2u8 {
            for v1 in [0u8, 128, 255] {
                data.extend_from_slice(&[i0 * 255, v1, 0]);
            }
        }
        let clut = Clut {
            grid_points: [2, 3, 0, 0],
            input_channels: 2,
            output_channels: 3,
            data: Grid::U8(&data),
        };
        let out = sample_clut(&clut, [1.0, 0.5, 0.0, 0.0]);
        assert!((out[0] - 1.0).abs() < 1e-6, "{out:?}");
        assert!((out[1] - 128.0 / 255.0).abs() < 1e-6, "{out:?}");

        let out = sample_clut(&clut, [0.25, 0.25, 0.0, 0.0]);
        assert!((out[0] - 0.25).abs() < 1e-6, "{out:?}");
        assert!((out[1] - 64.0 / 255.0).abs() < 1e-6, "{out:?}");
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_out_of_range_inputs_clamp() {
        let data = identity_grid();
        let clut = Clut {
            grid_points: [2, 2, 2, 0],
            input_channels: 3,
            output_channels: 3,
            data: Grid::U8(&data),
        };
        let out = sample_clut(&clut, [2.0, -1.0, f32::NAN, 0.0]);
        assert_eq!(&out[..3], &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_four_outputs() {
        let data = [0u8, 0, 0, 0, 255, 255, 255, 255];
        let clut = Clut {
            grid_points: [2, 0, 0, 0],
            input_channels: 1,
            output_channels: 4,
            data: Grid::U8(&data),
        };
        let out = sample_clut(&clut, [0.5, 0.0, 0.0, 0.0]);
        assert!(out.iter().all(|v| (v - 0.5).abs() < 1e-6));
    }
}
