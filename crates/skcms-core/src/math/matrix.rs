//! 3x3 and 3x4 matrix operations for color space transforms
//!
//! Values are stored as `f32`, row-major, matching the precision of the pixel
//! pipeline. Inversion is carried out in `f64` and validated before narrowing.

use std::ops::{Index, IndexMut, Mul};

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::math::fast::is_finite;

/// A three-component column vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector3 {
    pub v: [f32; 3],
}

impl Vector3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { v: [x, y, z] }
    }
}

/// A 3x3 matrix for color space transformations
///
/// Stored in row-major order: m[row][col]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Matrix3x3 {
    /// Matrix elements in row-major order
    pub m: [[f32; 3]; 3],
}

impl Matrix3x3 {
    /// Create a new matrix from row-major elements
    #[inline]
    pub const fn new(m: [[f32; 3]; 3]) -> Self {
        Self { m }
    }

    /// Create an identity matrix
    #[inline]
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Create a diagonal matrix from three values
    #[inline]
    pub const fn diagonal(d0: f32, d1: f32, d2: f32) -> Self {
        Self {
            m: [[d0, 0.0, 0.0], [0.0, d1, 0.0], [0.0, 0.0, d2]],
        }
    }

    /// Returns self × other
    pub fn concat(&self, other: &Self) -> Self {
        let mut m = [[0.0f32; 3]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            for (c, out) in row.iter_mut().enumerate() {
                *out = self.m[r][0] * other.m[0][c]
                    + self.m[r][1] * other.m[1][c]
                    + self.m[r][2] * other.m[2][c];
            }
        }
        Self { m }
    }

    /// Returns M × v
    #[inline]
    pub fn multiply_vec(&self, v: &Vector3) -> Vector3 {
        let [x, y, z] = v.v;
        Vector3 {
            v: [
                self.m[0][0] * x + self.m[0][1] * y + self.m[0][2] * z,
                self.m[1][0] * x + self.m[1][1] * y + self.m[1][2] * z,
                self.m[2][0] * x + self.m[2][1] * y + self.m[2][2] * z,
            ],
        }
    }

    /// Calculate the inverse of this matrix
    ///
    /// The cofactor expansion runs in `f64`. Fails with
    /// [`Error::SingularMatrix`] when the determinant is zero, the reciprocal
    /// determinant is out of `f32` range, or any resulting entry is not finite.
    pub fn invert(&self) -> Result<Self> {
        let v = &self.m;
        let a00 = v[0][0] as f64;
        let a01 = v[1][0] as f64;
        let a02 = v[2][0] as f64;
        let a10 = v[0][1] as f64;
        let a11 = v[1][1] as f64;
        let a12 = v[2][1] as f64;
        let a20 = v[0][2] as f64;
        let a21 = v[1][2] as f64;
        let a22 = v[2][2] as f64;

        let mut b0 = a00 * a11 - a01 * a10;
        let mut b1 = a00 * a12 - a02 * a10;
        let mut b2 = a01 * a12 - a02 * a11;
        let mut b3 = a20;
        let mut b4 = a21;
        let mut b5 = a22;

        let determinant = b0 * b5 - b1 * b4 + b2 * b3;
        if determinant == 0.0 {
            return Err(Error::SingularMatrix);
        }

        let invdet = 1.0 / determinant;
        if invdet > f32::MAX as f64 || invdet < -(f32::MAX as f64) || !is_finite(invdet as f32) {
            return Err(Error::SingularMatrix);
        }

        b0 *= invdet;
        b1 *= invdet;
        b2 *= invdet;
        b3 *= invdet;
        b4 *= invdet;
        b5 *= invdet;

        let mut m = [[0.0f32; 3]; 3];
        m[0][0] = (a11 * b5 - a12 * b4) as f32;
        m[1][0] = (a02 * b4 - a01 * b5) as f32;
        m[2][0] = b2 as f32;
        m[0][1] = (a12 * b3 - a10 * b5) as f32;
        m[1][1] = (a00 * b5 - a02 * b3) as f32;
        m[2][1] = (-b1) as f32;
        m[0][2] = (a10 * b4 - a11 * b3) as f32;
        m[1][2] = (a01 * b3 - a00 * b4) as f32;
        m[2][2] = b0 as f32;

        if m.iter().flatten().any(|&x| !is_finite(x)) {
            return Err(Error::SingularMatrix);
        }
        Ok(Self { m })
    }

    /// Row-major bytes, for exact (bitwise) comparisons
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Check if this matrix is approximately equal to another
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for Matrix3x3 {
    type Output = [f32; 3];

    fn index(&self, row: usize) -> &Self::Output {
        &self.m[row]
    }
}

impl IndexMut<usize> for Matrix3x3 {
    fn index_mut(&mut self, row: usize) -> &mut Self::Output {
        &mut self.m[row]
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.concat(&rhs)
    }
}

/// A 3x4 affine matrix: a 3x3 linear part plus a translation column
///
/// Stored in row-major order: m[row][col], column 3 is the offset.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Matrix3x4 {
    pub m: [[f32; 4]; 3],
}

impl Matrix3x4 {
    #[inline]
    pub const fn new(m: [[f32; 4]; 3]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Exact comparison against the identity
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Matrix3x4 {
    fn default() -> Self {
        Self::identity()
    }
}
