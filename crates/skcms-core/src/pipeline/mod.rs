//! Op programs: compilation and the reference interpreter

pub(crate) mod compiler;
pub(crate) mod interpreter;
pub mod ops;

pub use ops::{Channel, CurveOp, MAX_OPS, Op, Packing, Program};
