//! Wide backends
//!
//! The interpreter is inlined into each function below, so the lane loops
//! are compiled with the target's vector features enabled.
//!
//! The Skx backend is built for AVX2 as well: it differs in batch width
//! only. AVX-512 target features need a newer toolchain than this crate's
//! minimum.

use multiversion::multiversion;

use crate::pipeline::Op;
use crate::pipeline::interpreter::run;

#[multiversion(targets("x86_64+avx2+fma+f16c", "x86_64+sse4.1", "aarch64+neon",))]
pub(super) fn run_hsw<'a>(
    ops: &[Op<'a>],
    src: Option<&[u8]>,
    dst: &mut [u8],
    n: usize,
    src_bpp: usize,
    dst_bpp: usize,
) {
    run::<8>(ops, src, dst, n, src_bpp, dst_bpp)
}

#[multiversion(targets("x86_64+avx2+fma+f16c", "x86_64+sse4.1", "aarch64+neon",))]
pub(super) fn run_skx<'a>(
    ops: &[Op<'a>],
    src: Option<&[u8]>,
    dst: &mut [u8],
    n: usize,
    src_bpp: usize,
    dst_bpp: usize,
) {
    run::<16>(ops, src, dst, n, src_bpp, dst_bpp)
}
