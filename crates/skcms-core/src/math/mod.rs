//! Mathematical operations for color management
//!
//! This module provides foundational math operations used throughout skcms-core:
//! - Portable log2/exp2/pow approximations
//! - 3x3 and 3x4 matrix operations for RGB↔XYZ transforms
//! - Chromatic adaptation (Bradford)
//! - Multilinear interpolation for CLUT evaluation

pub mod chromatic_adaptation;
pub mod fast;
pub mod interpolation;
pub mod matrix;

pub use chromatic_adaptation::{adapt_to_xyzd50, primaries_to_xyzd50};
pub use matrix::{Matrix3x3, Matrix3x4, Vector3};
