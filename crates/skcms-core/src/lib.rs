//! # skcms-core - Small Color Management
//!
//! ICC profile parsing, transfer-function fitting and pixel conversion
//! pipelines in pure Rust.
//!
//! ## Overview
//!
//! - **Parsing**: ICC v2/v4 profiles are parsed without copying. Curve
//!   tables and CLUT grids borrow the caller's buffer.
//! - **Transfer functions**: sRGB-ish, PQ-ish and HLG-ish parametric curves
//!   with classification, evaluation, inversion and table approximation.
//! - **Transforms**: each conversion compiles a short op program and runs it
//!   on a scalar backend or a wide (AVX2 / NEON) one. Every backend gives
//!   the same bits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use skcms_core::{AlphaFormat, IccProfile, PixelFormat, transform};
//!
//! # fn main() -> skcms_core::Result<()> {
//! let bytes = std::fs::read("display.icc").unwrap();
//! let display = IccProfile::parse(&bytes)?;
//!
//! // Source profile `None` means sRGB.
//! let src = [255u8, 128, 64, 255];
//! let mut dst = [0u8; 4];
//! transform(
//!     &src,
//!     PixelFormat::Rgba8888,
//!     AlphaFormat::Unpremul,
//!     None,
//!     &mut dst,
//!     PixelFormat::Rgba8888,
//!     AlphaFormat::Unpremul,
//!     Some(&display),
//!     1,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. The crate never installs a
//! subscriber.

pub mod color;
pub mod config;
pub mod error;
pub mod icc;
pub mod math;
pub mod pipeline;
pub mod pixel;
pub mod profile;
pub mod simd;
pub mod transfer;
pub mod transform;

pub use config::{DispatchConfig, configure, disable_runtime_cpu_detection};
pub use error::{Error, Result};
pub use icc::{ColorSpaceSignature, Curve, IccError, IccTag, TagSignature, TypeSignature};
pub use math::{Matrix3x3, Matrix3x4, Vector3};
pub use pixel::{AlphaFormat, PixelFormat};
pub use profile::{
    IccProfile, approximately_equal_profiles, identity_transfer_function,
    srgb_inverse_transfer_function, srgb_profile, srgb_transfer_function, xyzd50_profile,
};
pub use simd::{Backend, CpuType, cpu_type};
pub use transfer::fit::{approximate_curve, are_approximate_inverses, max_roundtrip_error};
pub use transfer::{LegacyTransferFunction, TfType, TransferFunction};
pub use transform::{transform, transform_in_place, transform_with_backend};

/// Version of skcms-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
