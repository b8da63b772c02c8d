//! Color space helpers for the profile connection space

pub mod lab;
pub mod white_point;

pub use white_point::D50;
