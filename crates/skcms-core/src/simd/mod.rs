//! CPU capability detection and backend selection
//!
//! Every backend runs the same interpreter at a different lane count:
//!
//! | Backend  | Lanes | Requires |
//! |----------|-------|----------|
//! | `Scalar` | 1     | nothing |
//! | `Hsw`    | 8     | AVX2, F16C, FMA |
//! | `Skx`    | 16    | AVX-512 F/DQ/CD/BW/VL |
//!
//! Output is bit-identical across backends.

mod wide;

use std::sync::OnceLock;

use crate::config::{self, DispatchConfig};
use crate::pipeline::Op;
use crate::pipeline::interpreter;

/// Capability class of the running CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuType {
    Baseline,
    /// Haswell-class x86-64
    Hsw,
    /// Skylake-X-class x86-64
    Skx,
}

impl CpuType {
    /// Classify the host CPU. Always `Baseline` when detection is disabled.
    pub fn detect(config: &DispatchConfig) -> Self {
        if !config.allow_runtime_cpu_detection {
            return CpuType::Baseline;
        }

        #[cfg(target_arch = "x86_64")]
        {
            let hsw = is_x86_feature_detected!("avx2")
                && is_x86_feature_detected!("f16c")
                && is_x86_feature_detected!("fma");
            let skx = is_x86_feature_detected!("avx512f")
                && is_x86_feature_detected!("avx512dq")
                && is_x86_feature_detected!("avx512cd")
                && is_x86_feature_detected!("avx512bw")
                && is_x86_feature_detected!("avx512vl");
            if hsw && skx {
                return CpuType::Skx;
            }
            if hsw {
                return CpuType::Hsw;
            }
        }

        CpuType::Baseline
    }
}

static CPU_TYPE: OnceLock<CpuType> = OnceLock::new();

/// The host CPU type, detected once per process under the active
/// configuration
pub fn cpu_type() -> CpuType {
    *CPU_TYPE.get_or_init(|| {
        let config = config::current();
        let cpu = CpuType::detect(&config);
        tracing::debug!(
            ?cpu,
            allow_runtime_cpu_detection = config.allow_runtime_cpu_detection,
            "resolved cpu type"
        );
        cpu
    })
}

/// A pipeline executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Scalar,
    Hsw,
    Skx,
}

impl Backend {
    /// The backend for the host CPU
    pub fn detected() -> Self {
        cpu_type().into()
    }

    /// Backends this host can run, scalar first
    pub fn available() -> Vec<Self> {
        match cpu_type() {
            CpuType::Baseline => vec![Backend::Scalar],
            CpuType::Hsw => vec![Backend::Scalar, Backend::Hsw],
            CpuType::Skx => vec![Backend::Scalar, Backend::Hsw, Backend::Skx],
        }
    }

    /// Pixels processed per batch
    pub fn lanes(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::Hsw => 8,
            Backend::Skx => 16,
        }
    }

    pub(crate) fn run<'a>(
        self,
        ops: &[Op<'a>],
        src: Option<&[u8]>,
        dst: &mut [u8],
        n: usize,
        src_bpp: usize,
        dst_bpp: usize,
    ) {
        match self {
            Backend::Scalar => interpreter::run::<1>(ops, src, dst, n, src_bpp, dst_bpp),
            Backend::Hsw => wide::run_hsw(ops, src, dst, n, src_bpp, dst_bpp),
            Backend::Skx => wide::run_skx(ops, src, dst, n, src_bpp, dst_bpp),
        }
    }
}

impl From<CpuType> for Backend {
    fn from(cpu: CpuType) -> Self {
        match cpu {
            CpuType::Baseline => Backend::Scalar,
            CpuType::Hsw => Backend::Hsw,
            CpuType::Skx => Backend::Skx,
        }
    }
}
