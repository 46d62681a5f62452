//! Constellation implementations
//!
//! All modulation schemes usable on preamble or payload subcarriers:
//! - BPSK (1 bit/symbol)
//! - QPSK (2 bits/symbol)
//! - 16-QAM (4 bits/symbol)
//! - 16-PSK (4 bits/symbol)
//!
//! `Modulation` is the runtime selector carried by frame parameters; it
//! dispatches to the trait implementations for whole bit/symbol vectors.

mod bpsk;
mod psk16;
mod qam16;
mod qpsk;

pub use bpsk::Bpsk;
pub use psk16::Psk16;
pub use qam16::Qam16;
pub use qpsk::Qpsk;

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{OfdmError, Result};
use crate::traits::Constellation;

// ============================================================================
// Modulation selector
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modulation {
    #[serde(rename = "BPSK")]
    Bpsk,
    #[serde(rename = "QPSK")]
    Qpsk,
    #[serde(rename = "16QAM")]
    Qam16,
    #[serde(rename = "16PSK")]
    Psk16,
}

impl Modulation {
    pub const ALL: [Modulation; 4] = [
        Modulation::Bpsk,
        Modulation::Qpsk,
        Modulation::Qam16,
        Modulation::Psk16,
    ];

    pub fn constellation(&self) -> &'static dyn Constellation {
        match self {
            Self::Bpsk => &Bpsk,
            Self::Qpsk => &Qpsk,
            Self::Qam16 => &Qam16,
            Self::Psk16 => &Psk16,
        }
    }

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Self::Bpsk => 1,
            Self::Qpsk => 2,
            Self::Qam16 => 4,
            Self::Psk16 => 4,
        }
    }

    /// Canonical scheme name ("BPSK", "QPSK", "16QAM", "16PSK")
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bpsk => "BPSK",
            Self::Qpsk => "QPSK",
            Self::Qam16 => "16QAM",
            Self::Psk16 => "16PSK",
        }
    }

    /// Map a bit stream to symbols
    ///
    /// # Errors
    /// `InvalidBitLength` if the length is not a multiple of the bits per
    /// symbol or a value other than 0/1 is present.
    pub fn map(&self, bits: &[u8]) -> Result<Vec<Complex64>> {
        let bps = self.bits_per_symbol();
        if bits.len() % bps != 0 {
            return Err(OfdmError::InvalidBitLength {
                scheme: self.name().to_string(),
                reason: format!("{} bits is not a multiple of {}", bits.len(), bps),
            });
        }
        if let Some(pos) = bits.iter().position(|&b| b > 1) {
            return Err(OfdmError::InvalidBitLength {
                scheme: self.name().to_string(),
                reason: format!("value {} at index {} is not a bit", bits[pos], pos),
            });
        }

        let constellation = self.constellation();
        Ok(bits.chunks_exact(bps).map(|group| constellation.map_bits(group)).collect())
    }

    /// Hard-decision inverse mapping of a symbol stream
    pub fn demap(&self, symbols: &[Complex64]) -> Vec<u8> {
        let constellation = self.constellation();
        let mut bits = Vec::with_capacity(symbols.len() * self.bits_per_symbol());
        for &sym in symbols {
            constellation.demap_into(sym, &mut bits);
        }
        bits
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modulation {
    type Err = OfdmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BPSK" => Ok(Self::Bpsk),
            "QPSK" => Ok(Self::Qpsk),
            "16QAM" => Ok(Self::Qam16),
            "16PSK" => Ok(Self::Psk16),
            _ => Err(OfdmError::InvalidConstellation(s.to_string())),
        }
    }
}
