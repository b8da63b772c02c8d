//! ICC Profile Parsing
//!
//! Native parsing of ICC.1 v2/v4 profiles, restricted to what color
//! conversion needs.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data (may overlap/share data)
//!
//! Parsing never copies: curve tables and CLUT grids are borrowed from the
//! input buffer, so a parsed [`IccProfile`](crate::IccProfile) lives no
//! longer than the bytes it came from.

pub mod header;
pub mod tags;
pub mod types;

mod error;
mod parser;

pub use error::IccError;
pub use header::IccHeader;
pub use parser::DEFAULT_A2B_PRIORITY;
pub use tags::{A2B, B2A, Cicp, Clut, ClutStage, Curve, Grid, IccTag, MatrixStage};
pub use types::{ColorSpaceSignature, TagSignature, TypeSignature};
