//! Error types for skcms-core

use thiserror::Error;

use crate::icc::IccError;

/// Result type for skcms-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in skcms-core operations
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or unsupported ICC profile data
    #[error(transparent)]
    Icc(#[from] IccError),

    /// Matrix determinant is zero or the inverse is not finite
    #[error("Matrix is singular or its inverse is not finite")]
    SingularMatrix,

    /// Transfer function has no valid inverse
    #[error("Transfer function is not invertible")]
    NotInvertible,

    /// No parametric curve approximates the table within tolerance
    #[error("Curve could not be approximated by a parametric transfer function")]
    ApproximationFailed,

    /// Chromaticity or white point coordinate outside [0, 1]
    #[error("Chromaticity coordinates must lie in [0, 1]")]
    InvalidChromaticity,

    /// Profile cannot be used as a transform destination
    #[error("Profile is not usable as a transform destination")]
    UnusableDestination,

    /// Profile cannot be used as a transform source
    #[error("Profile is not usable as a transform source")]
    UnusableSource,

    /// Numeric pixel format code with no matching format
    #[error("Unknown pixel format code: {0}")]
    UnknownPixelFormat(u32),

    /// Buffer size mismatch
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Pixel count whose byte size overflows `i32::MAX`
    #[error("Pixel count {count} overflows the addressable byte range")]
    TooManyPixels { count: usize },

    /// In-place transform between formats of different pixel sizes
    #[error("In-place transform needs equal pixel sizes (src {src} bytes, dst {dst} bytes)")]
    InPlaceSizeMismatch { src: usize, dst: usize },

    /// Compiled program exceeded its fixed op capacity
    #[error("Transform program exceeded its op capacity")]
    ProgramOverflow,

    /// Dispatch configuration was already fixed
    #[error("Dispatch configuration was already set or already in use")]
    AlreadyConfigured,
}
