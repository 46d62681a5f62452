//! Utility functions for DSP operations

mod quantize;
mod math;

pub use quantize::{quantize_sc16, SC16_FULL_SCALE};
pub use math::*;
