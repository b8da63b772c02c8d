//! Backend parity checking
//!
//! Every backend must produce the same bytes as the scalar backend.

use skcms_core::{AlphaFormat, Backend, IccProfile, PixelFormat, transform_with_backend};
use thiserror::Error;

/// Backends compared against [`Backend::Scalar`]
pub const WIDE_BACKENDS: [Backend; 2] = [Backend::Hsw, Backend::Skx];

#[derive(Error, Debug)]
pub enum ParityError {
    #[error("transform failed: {0}")]
    Transform(#[from] skcms_core::Error),

    #[error("{backend:?} differs from scalar at byte {index}: {actual:#04x} != {expected:#04x}")]
    Mismatch {
        backend: Backend,
        index: usize,
        expected: u8,
        actual: u8,
    },
}

/// One side of a transform
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'p, 'a> {
    pub format: PixelFormat,
    pub alpha: AlphaFormat,
    pub profile: Option<&'p IccProfile<'a>>,
}

impl<'p, 'a> Endpoint<'p, 'a> {
    pub fn new(format: PixelFormat, profile: Option<&'p IccProfile<'a>>) -> Self {
        Self {
            format,
            alpha: AlphaFormat::Unpremul,
            profile,
        }
    }

    pub fn alpha(mut self, alpha: AlphaFormat) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Run one transform on `backend`
pub fn run_on(
    backend: Backend,
    src: &[u8],
    from: Endpoint<'_, '_>,
    to: Endpoint<'_, '_>,
) -> Result<Vec<u8>, skcms_core::Error> {
    let n = src.len() / from.format.bytes_per_pixel();
    let mut dst = vec![0u8; n * to.format.bytes_per_pixel()];
    transform_with_backend(
        backend,
        src,
        from.format,
        from.alpha,
        from.profile,
        &mut dst,
        to.format,
        to.alpha,
        to.profile,
        n,
    )?;
    Ok(dst)
}

/// Check that every wide backend matches the scalar backend bit for bit.
/// Returns the scalar output.
pub fn check_backend_parity(
    src: &[u8],
    from: Endpoint<'_, '_>,
    to: Endpoint<'_, '_>,
) -> Result<Vec<u8>, ParityError> {
    let expected = run_on(Backend::Scalar, src, from, to)?;
    for backend in WIDE_BACKENDS {
        let actual = run_on(backend, src, from, to)?;
        if let Some(index) = expected.iter().zip(&actual).position(|(e, a)| e != a) {
            return Err(ParityError::Mismatch {
                backend,
                index,
                expected: expected[index],
                actual: actual[index],
            });
        }
    }
    Ok(expected)
}
