//! # cms-tests
//!
//! Integration testing support for skcms-core.
//!
//! This crate provides:
//! - Builders that write synthetic ICC profiles byte by byte
//! - Deterministic pixel patterns for every pixel format
//! - Backend parity helpers
//!
//! ## Test Categories
//!
//! 1. **Profile Parsing**: Valid, truncated and corrupted profiles
//! 2. **Pixel Formats**: Load/store behaviour of every format
//! 3. **LUT Profiles**: A2B/B2A pipelines, CMYK, gray
//! 4. **Curve Fitting**: Table approximation and make-usable
//! 5. **Backend Parity**: Bit-exact agreement with the scalar backend
//! 6. **Concurrency**: Transforms across threads

pub mod builder;
pub mod parity;
pub mod patterns;

pub use builder::{LutAb, ProfileBuilder};
pub use parity::{Endpoint, ParityError, check_backend_parity, run_on};
pub use patterns::{TestPattern, encode_pattern, generate_pattern};
