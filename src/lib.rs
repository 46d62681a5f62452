//! RadCom PHY - OFDM radar-communication frame engine
//!
//! This crate builds, transmits and receives one OFDM frame: a preamble with
//! two identical halves followed by pilot-bearing payload symbols. The
//! receive side recovers frame timing from the preamble autocorrelation,
//! estimates the channel from the pilots and scores the recovered bits.
//!
//! ```text
//! bits ──►[Constellation]──►[IFFT + CP]──►[Channel]──►[Timing sync]
//!                                                         │
//!   BER ◄──[Demap]◄──[Equalize]◄──[Pilot estimate]◄──[CP strip + FFT]
//! ```

pub mod traits;
pub mod constellations;
pub mod frame;
pub mod modem;
pub mod channel;
pub mod sync;
pub mod estimation;
pub mod ber;
pub mod io;
pub mod receiver;
mod error;
mod utils;

// Re-export core types for convenience
pub use traits::{Constellation, MetricTrace, TimingMetric};
pub use constellations::{Bpsk, Modulation, Psk16, Qam16, Qpsk};
pub use frame::{FrameParams, OfdmFrame, PilotGrid, ReceivedWaveform};
pub use modem::{CpRemoval, Demodulated, OfdmDemodulator, OfdmModulator};
pub use channel::{MultipathChannel, NoiseGenerator};
pub use estimation::Equalized;
pub use sync::{find_peak, MetricKind, PeakDetector};
pub use receiver::{ReceiveReport, Receiver, ReceiverConfig, SyncResult};
pub use error::{Discrepancy, OfdmError, Result};
pub use utils::{moving_sum, quantize_sc16};
