//! Core modem implementations
//!
//! IFFT/cyclic-prefix modulator and CP-removal/FFT demodulator. Both are
//! built for one frame geometry and hold their FFT plans.

mod demodulator;
mod modulator;

pub use demodulator::{CpRemoval, Demodulated, OfdmDemodulator};
pub use modulator::OfdmModulator;

#[cfg(test)]
mod modem_tests;
