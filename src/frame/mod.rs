//! OFDM frame model
//!
//! A frame owns everything known about one transmission:
//!
//! ```text
//! | preamble (CP + K)·M | payload symbol 0 | ... | payload symbol N−1 |
//! ```
//!
//! - the preamble, one symbol with every odd subcarrier zeroed so that its
//!   time-domain body is two identical halves
//! - N payload symbols with data and pilots drawn from the same alphabet
//! - the transmitted waveform, and the received waveform once set
//! - the latest received payload, channel estimate and equalized payload
//!
//! Every random draw comes from one `ChaCha8Rng` seeded from the frame
//! parameters, in a fixed order: preamble, payload, then channel noise.
//! Two frames built from equal parameters are bit-identical.

mod params;
mod pilots;

pub use params::FrameParams;
pub use pilots::PilotGrid;

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustfft::FftPlanner;
use tracing::{debug, warn};

use crate::ber;
use crate::channel::{self, MultipathChannel};
use crate::constellations::Modulation;
use crate::error::{Discrepancy, OfdmError, Result};
use crate::estimation;
use crate::modem::{CpRemoval, OfdmDemodulator, OfdmModulator};
use crate::utils::mean_power;

/// Received time-domain waveform
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedWaveform {
    pub samples: Vec<Complex64>,
    /// Payload rows still carry their cyclic prefix
    pub cp_present: bool,
}

/// Draw `K·bps` uniform bits, or validate the caller's bits, and map them
fn draw_symbol(
    rng: &mut ChaCha8Rng,
    k: usize,
    scheme: Modulation,
    bits: Option<&[u8]>,
) -> Result<(Vec<Complex64>, Vec<u8>)> {
    let needed = k * scheme.bits_per_symbol();
    let bits = match bits {
        Some(bits) if bits.len() != needed => {
            return Err(OfdmError::InvalidBitLength {
                scheme: scheme.name().to_string(),
                reason: format!("{} bits for a {}-bit symbol row", bits.len(), needed),
            });
        }
        Some(bits) => bits.to_vec(),
        None => (0..needed).map(|_| rng.gen_range(0..2u8)).collect(),
    };

    let symbols = scheme.map(&bits)?;
    Ok((symbols, bits))
}

fn draw_preamble(rng: &mut ChaCha8Rng, params: &FrameParams) -> Result<Vec<Complex64>> {
    let (mut symbols, _) = draw_symbol(rng, params.k, params.preamble_mod, None)?;
    for s in symbols.iter_mut().skip(1).step_by(2) {
        *s = Complex64::new(0.0, 0.0);
    }
    Ok(symbols)
}

fn draw_payload(
    rng: &mut ChaCha8Rng,
    params: &FrameParams,
) -> Result<(Vec<Vec<Complex64>>, Vec<Vec<u8>>)> {
    let mut rows = Vec::with_capacity(params.n);
    let mut bits = Vec::with_capacity(params.n);
    for _ in 0..params.n {
        let (row, row_bits) = draw_symbol(rng, params.k, params.payload_mod, None)?;
        rows.push(row);
        bits.push(row_bits);
    }
    Ok((rows, bits))
}

/// One OFDM radar-communication frame
pub struct OfdmFrame {
    params: FrameParams,
    rng: ChaCha8Rng,
    pilots: PilotGrid,
    modulator: OfdmModulator,
    demodulator: OfdmDemodulator,

    preamble: Vec<Complex64>,
    payload: Vec<Vec<Complex64>>,
    payload_bits: Vec<Vec<u8>>,
    tx: Vec<Complex64>,

    rx: Option<ReceivedWaveform>,
    rx_payload: Option<Vec<Vec<Complex64>>>,
    channel_estimate: Option<Vec<Vec<Complex64>>>,
    equalized: Option<Vec<Vec<Complex64>>>,
}

impl OfdmFrame {
    /// Build a frame: validate parameters, draw symbols, modulate
    ///
    /// # Errors
    /// `InvalidFrameParameter` for any out-of-range parameter.
    pub fn new(params: FrameParams) -> Result<Self> {
        params.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let pilots = PilotGrid::new(params.n, params.k, params.nt, params.nf);

        let mut planner = FftPlanner::new();
        let modulator = OfdmModulator::with_planner(&params, &mut planner);
        let demodulator = OfdmDemodulator::with_planner(&params, &mut planner);

        let preamble = draw_preamble(&mut rng, &params)?;
        let (payload, payload_bits) = draw_payload(&mut rng, &params)?;
        let tx = modulator.modulate_frame(&preamble, &payload)?;
        debug_assert_eq!(tx.len(), params.frame_tlen());

        debug!(
            k = params.k,
            cp = params.cp,
            m = params.m,
            n = params.n,
            preamble = %params.preamble_mod,
            payload = %params.payload_mod,
            pilots = pilots.len(),
            "built OFDM frame"
        );

        Ok(Self {
            params,
            rng,
            pilots,
            modulator,
            demodulator,
            preamble,
            payload,
            payload_bits,
            tx,
            rx: None,
            rx_payload: None,
            channel_estimate: None,
            equalized: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn params(&self) -> &FrameParams {
        &self.params
    }

    pub fn pilot_grid(&self) -> &PilotGrid {
        &self.pilots
    }

    /// Data bits carried by the payload (pilots excluded)
    pub fn total_bits(&self) -> usize {
        self.pilots.data_len() * self.params.payload_mod.bits_per_symbol()
    }

    /// Preamble subcarriers, odd indices zero
    pub fn preamble(&self) -> &[Complex64] {
        &self.preamble
    }

    /// Transmitted payload subcarriers (N×K)
    pub fn payload(&self) -> &[Vec<Complex64>] {
        &self.payload
    }

    /// Bits mapped onto each payload row, pilots included
    pub fn payload_bits(&self) -> &[Vec<u8>] {
        &self.payload_bits
    }

    /// Transmitted time-domain frame, `frame_tlen` samples
    pub fn tx_waveform(&self) -> &[Complex64] {
        &self.tx
    }

    pub fn rx_waveform(&self) -> Option<&ReceivedWaveform> {
        self.rx.as_ref()
    }

    /// Latest demodulated payload, before equalization
    pub fn rx_payload(&self) -> Option<&[Vec<Complex64>]> {
        self.rx_payload.as_deref()
    }

    pub fn channel_estimate(&self) -> Option<&[Vec<Complex64>]> {
        self.channel_estimate.as_deref()
    }

    pub fn equalized_payload(&self) -> Option<&[Vec<Complex64>]> {
        self.equalized.as_deref()
    }

    pub fn modulator(&self) -> &OfdmModulator {
        &self.modulator
    }

    // ========================================================================
    // Symbol generation
    // ========================================================================

    /// One row of K symbols, from `bits` or from the frame generator
    ///
    /// # Errors
    /// `InvalidBitLength` if `bits` does not hold exactly `K·bps` bits.
    pub fn generate_symbol(
        &mut self,
        scheme: Modulation,
        bits: Option<&[u8]>,
    ) -> Result<(Vec<Complex64>, Vec<u8>)> {
        draw_symbol(&mut self.rng, self.params.k, scheme, bits)
    }

    /// A fresh preamble symbol with odd subcarriers zeroed
    pub fn generate_preamble(&mut self) -> Result<Vec<Complex64>> {
        draw_preamble(&mut self.rng, &self.params)
    }

    /// N fresh payload rows and their bits
    pub fn generate_payload(&mut self) -> Result<(Vec<Vec<Complex64>>, Vec<Vec<u8>>)> {
        draw_payload(&mut self.rng, &self.params)
    }

    // ========================================================================
    // Received waveform
    // ========================================================================

    /// Replace the received waveform and drop everything derived from it
    pub fn set_rx(&mut self, samples: Vec<Complex64>, cp_present: bool) {
        self.rx = Some(ReceivedWaveform { samples, cp_present });
        self.rx_payload = None;
        self.channel_estimate = None;
        self.equalized = None;
    }

    /// Store a captured waveform, checking its length against the frame
    ///
    /// Captures keep their cyclic prefixes. A capture exactly one preamble
    /// short of a full frame had its preamble removed upstream. Any other
    /// length is kept as-is and reconciled at demodulation.
    pub fn load_rx(&mut self, samples: Vec<Complex64>) -> Vec<Discrepancy> {
        let expected = self.params.frame_tlen();
        let actual = samples.len();

        let mut discrepancies = Vec::new();
        if actual != expected {
            let d = if expected.checked_sub(actual) == Some(self.params.preamble_tlen()) {
                Discrepancy::PreambleStripped { expected, actual }
            } else {
                Discrepancy::LengthMismatch { expected, actual }
            };
            warn!("{}", d);
            discrepancies.push(d);
        }

        self.set_rx(samples, true);
        discrepancies
    }

    // ========================================================================
    // Channel simulation
    // ========================================================================

    /// Mean power of the transmitted payload with cyclic prefixes removed
    fn payload_power(&self) -> f64 {
        let symbol_tlen = self.params.symbol_tlen();
        let cp_len = self.params.cp_len();
        let bodies: Vec<Complex64> = self.tx[self.params.preamble_tlen()..]
            .chunks_exact(symbol_tlen)
            .flat_map(|row| row[cp_len..].iter().copied())
            .collect();
        mean_power(&bodies)
    }

    fn noise_power(&self, snr_db: f64) -> Result<f64> {
        if snr_db.is_nan() || snr_db == f64::NEG_INFINITY {
            return Err(OfdmError::InvalidParameter(format!("SNR must not be {}", snr_db)));
        }
        let bps = self.params.payload_mod.bits_per_symbol();
        Ok(channel::noise_power_for_snr(self.payload_power(), snr_db, bps))
    }

    /// Transmit over an AWGN channel at `snr_db` (Eb/N0)
    ///
    /// The result becomes the received waveform, cyclic prefixes present.
    /// `snr_db = +∞` stores the transmitted frame unchanged.
    pub fn add_noise(&mut self, snr_db: f64) -> Result<()> {
        let noise_power = self.noise_power(snr_db)?;
        debug!(snr_db, noise_power, "AWGN channel");
        let rx = channel::add_awgn(&self.tx, noise_power, &mut self.rng);
        self.set_rx(rx, true);
        Ok(())
    }

    /// Transmit over a multipath channel, then AWGN at `snr_db`
    ///
    /// The noise level is set from the transmitted payload power. The
    /// received waveform is `max(delay)` samples longer than the frame.
    ///
    /// # Errors
    /// `InvalidParameter` for mismatched or empty gain/delay lists.
    pub fn add_paths(&mut self, gains: &[f64], delays: &[usize], snr_db: f64) -> Result<()> {
        let channel = MultipathChannel::new(gains, delays)?;
        let noise_power = self.noise_power(snr_db)?;
        debug!(paths = channel.num_paths(), max_delay = channel.max_delay(), snr_db, "multipath channel");

        let faded = channel.apply(&self.tx);
        let rx = channel::add_awgn(&faded, noise_power, &mut self.rng);
        self.set_rx(rx, true);
        Ok(())
    }

    // ========================================================================
    // Receive chain
    // ========================================================================

    /// Demodulate the stored waveform starting at sample `offset`
    ///
    /// # Errors
    /// `NoReceivedWaveform` if nothing was received yet.
    pub fn demodulate_from(&mut self, offset: usize, side: CpRemoval) -> Result<Option<Discrepancy>> {
        let rx = self.rx.as_ref().ok_or(OfdmError::NoReceivedWaveform)?;
        let start = offset.min(rx.samples.len());
        let out = self.demodulator.demodulate(&rx.samples[start..], rx.cp_present, side);

        self.rx_payload = Some(out.symbols);
        self.channel_estimate = None;
        self.equalized = None;
        Ok(out.discrepancy)
    }

    /// Demodulate the stored waveform
    ///
    /// `remove_first_symbol` skips a leading preamble block. The stored
    /// waveform itself is left untouched.
    pub fn demodulate(&mut self, side: CpRemoval, remove_first_symbol: bool) -> Result<Option<Discrepancy>> {
        let offset = if remove_first_symbol {
            self.params.preamble_tlen()
        } else {
            0
        };
        self.demodulate_from(offset, side)
    }

    /// Demodulated payload, or the error naming the missing step
    fn demodulated_payload(&self) -> Result<&[Vec<Complex64>]> {
        match (&self.rx_payload, &self.rx) {
            (Some(rx), _) => Ok(rx.as_slice()),
            (None, Some(_)) => Err(OfdmError::NotDemodulated),
            (None, None) => Err(OfdmError::NoReceivedWaveform),
        }
    }

    /// Estimate the channel from the pilots of the demodulated payload
    pub fn estimate_channel(&mut self) -> Result<&[Vec<Complex64>]> {
        let rx = self.demodulated_payload()?;
        let h = estimation::estimate_channel(&self.payload, rx, &self.pilots);
        let h = self.channel_estimate.insert(h);
        Ok(h.as_slice())
    }

    /// Re-estimate the channel and equalize the demodulated payload
    ///
    /// The result is kept on the frame (`equalized_payload`). Positions
    /// with a zero estimate are equalized to 0 and reported.
    pub fn equalize(&mut self) -> Result<Option<Discrepancy>> {
        let h = estimation::estimate_channel(&self.payload, self.demodulated_payload()?, &self.pilots);
        let out = estimation::equalize(self.demodulated_payload()?, &h);
        self.channel_estimate = Some(h);
        self.equalized = Some(out.symbols);
        Ok(out.discrepancy)
    }

    /// Received payload used for decisions: equalized when available
    fn decided_payload(&self) -> Result<&[Vec<Complex64>]> {
        match &self.equalized {
            Some(eq) => Ok(eq.as_slice()),
            None => self.demodulated_payload(),
        }
    }

    /// Hard-decision bits at the data positions of the received payload
    pub fn rx_bits(&self) -> Result<Vec<u8>> {
        let rx = self.decided_payload()?;
        Ok(ber::data_bits(rx, &self.pilots, self.params.payload_mod))
    }

    /// Bit error rate of the received payload against the transmitted one
    pub fn compute_ber(&self) -> Result<f64> {
        let rx = self.decided_payload()?;
        Ok(ber::compute_ber(&self.payload, rx, &self.pilots, self.params.payload_mod))
    }
}
