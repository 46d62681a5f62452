//! Pilot grid
//!
//! Pilots sit on a rectangular lattice of the N×K payload grid. The first
//! and the last index are always part of the lattice in both dimensions,
//! so interpolating between pilots never extrapolates.
//!
//! ```text
//! Nt = 1, Nf = 3, K = 10
//!
//! |<------------- subcarriers ----------->|
//! | P | D | D | P | D | D | P | D | D | P |  |
//! | P | D | D | P | D | D | P | D | D | P | time
//! | P | D | D | P | D | D | P | D | D | P |  v
//! ```

/// Pilot positions over the payload grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotGrid {
    n: usize,
    k: usize,
    time_idx: Vec<usize>,
    freq_idx: Vec<usize>,
    mask: Vec<bool>,
}

/// `{0, step, 2·step, …} ∩ [0, len−1)` followed by `len − 1`
fn lattice(len: usize, step: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..len.saturating_sub(1)).step_by(step.max(1)).collect();
    idx.push(len - 1);
    idx
}

impl PilotGrid {
    /// Build the grid for `n` symbols × `k` subcarriers
    ///
    /// `n`, `k`, `nt` and `nf` must be at least 1 (guaranteed by
    /// `FrameParams::validate`).
    pub fn new(n: usize, k: usize, nt: usize, nf: usize) -> Self {
        let time_idx = lattice(n, nt);
        let freq_idx = lattice(k, nf);

        let mut mask = vec![false; n * k];
        for &t in &time_idx {
            for &f in &freq_idx {
                mask[t * k + f] = true;
            }
        }

        Self { n, k, time_idx, freq_idx, mask }
    }

    /// Pilot OFDM symbol indices (ascending)
    pub fn time_indices(&self) -> &[usize] {
        &self.time_idx
    }

    /// Pilot subcarrier indices (ascending)
    pub fn freq_indices(&self) -> &[usize] {
        &self.freq_idx
    }

    #[inline]
    pub fn is_pilot(&self, t: usize, f: usize) -> bool {
        self.mask[t * self.k + f]
    }

    /// Number of pilot positions
    pub fn len(&self) -> usize {
        self.time_idx.len() * self.freq_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of data (non-pilot) positions
    pub fn data_len(&self) -> usize {
        self.n * self.k - self.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.k)
    }

    /// Row-major mask, `true` at pilots
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Data positions `(t, f)` in row-major order
    pub fn data_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let k = self.k;
        self.mask
            .iter()
            .enumerate()
            .filter(|&(_, &pilot)| !pilot)
            .map(move |(i, _)| (i / k, i % k))
    }
}
