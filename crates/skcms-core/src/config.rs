//! Process-wide dispatch configuration
//!
//! Configuration is set at most once. The first transform resolves the
//! default if nothing was configured before it, and later calls to
//! [`configure`] fail. Changing configuration after first use is not
//! supported.

use std::sync::OnceLock;

use crate::error::{Error, Result};

/// How transforms choose a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Probe the CPU for wide backends. When false, every transform uses the
    /// scalar backend.
    pub allow_runtime_cpu_detection: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            allow_runtime_cpu_detection: true,
        }
    }
}

static CONFIG: OnceLock<DispatchConfig> = OnceLock::new();

/// Set the process-wide configuration
///
/// Fails with [`Error::AlreadyConfigured`] if a configuration was already
/// set, including the default fixed by the first transform.
pub fn configure(config: DispatchConfig) -> Result<()> {
    CONFIG.set(config).map_err(|_| Error::AlreadyConfigured)
}

/// Restrict every transform to the scalar backend
pub fn disable_runtime_cpu_detection() -> Result<()> {
    configure(DispatchConfig {
        allow_runtime_cpu_detection: false,
    })
}

/// The active configuration, fixing the default if none was set
pub fn current() -> DispatchConfig {
    *CONFIG.get_or_init(DispatchConfig::default)
}
