//! Interleaved I/Q waveform codecs
//!
//! | Format | Bytes/Sample | Layout                                  |
//! |--------|--------------|-----------------------------------------|
//! | Fc32   | 8            | little-endian `f32` I, then `f32` Q     |
//! | Sc16   | 4            | little-endian `i16` I, then `i16` Q     |
//! | text   | -            | whitespace-separated floats, I then Q   |
//!
//! Readers recombine values as `re = v[0::2]`, `im = v[1::2]`. With
//! `ignore_zero`, values exactly equal to 0 are dropped before pairing
//! (zero-padding inserted by the capture chain).
//!
//! Transmit waveforms are written normalized so that the largest absolute
//! interleaved value is [`TX_PEAK`].

use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OfdmError, Result};
use crate::utils::quantize_sc16;

/// Peak absolute value of a normalized transmit waveform
pub const TX_PEAK: f64 = 0.7;

/// Binary sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Complex float32
    #[default]
    Fc32,
    /// Complex signed int16, raw integer values
    Sc16,
}

impl SampleFormat {
    #[inline]
    pub const fn bytes_per_value(&self) -> usize {
        match self {
            SampleFormat::Fc32 => 4,
            SampleFormat::Sc16 => 2,
        }
    }

    pub const fn bytes_per_sample(&self) -> usize {
        2 * self.bytes_per_value()
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::Fc32 => f.write_str("fc32"),
            SampleFormat::Sc16 => f.write_str("sc16"),
        }
    }
}

impl FromStr for SampleFormat {
    type Err = OfdmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fc32" | "cf32" | "f32" => Ok(SampleFormat::Fc32),
            "sc16" | "ci16" | "i16" => Ok(SampleFormat::Sc16),
            other => Err(OfdmError::InvalidParameter(format!(
                "unknown sample format '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Readers
// ============================================================================

fn pair_values(values: Vec<f64>, ignore_zero: bool) -> Result<Vec<Complex64>> {
    let values: Vec<f64> = if ignore_zero {
        values.into_iter().filter(|&v| v != 0.0).collect()
    } else {
        values
    };

    if values.len() % 2 != 0 {
        return Err(OfdmError::InvalidParameter(format!(
            "odd number of interleaved values ({})",
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(2)
        .map(|iq| Complex64::new(iq[0], iq[1]))
        .collect())
}

/// Decode interleaved binary I/Q values
///
/// # Errors
/// `InvalidParameter` on a partial value or an odd value count.
pub fn decode_samples(bytes: &[u8], format: SampleFormat, ignore_zero: bool) -> Result<Vec<Complex64>> {
    let width = format.bytes_per_value();
    if bytes.len() % width != 0 {
        return Err(OfdmError::InvalidParameter(format!(
            "{} bytes is not a whole number of {} values",
            bytes.len(),
            format
        )));
    }

    let values: Vec<f64> = match format {
        SampleFormat::Fc32 => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect(),
        SampleFormat::Sc16 => bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f64)
            .collect(),
    };

    pair_values(values, ignore_zero)
}

/// Read a whole binary I/Q stream
pub fn read_samples<R: Read>(reader: &mut R, format: SampleFormat, ignore_zero: bool) -> Result<Vec<Complex64>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let samples = decode_samples(&bytes, format, ignore_zero)?;
    debug!(%format, samples = samples.len(), "read binary waveform");
    Ok(samples)
}

/// Read whitespace-separated interleaved values
pub fn read_text<R: Read>(reader: R, ignore_zero: bool) -> Result<Vec<Complex64>> {
    let mut values = Vec::new();
    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| {
                OfdmError::InvalidParameter(format!(
                    "line {}: '{}' is not a number",
                    line_no + 1,
                    token
                ))
            })?;
            values.push(v);
        }
    }

    let samples = pair_values(values, ignore_zero)?;
    debug!(samples = samples.len(), "read text waveform");
    Ok(samples)
}

// ============================================================================
// Writers
// ============================================================================

/// Interleave I/Q and scale so the largest absolute value is `TX_PEAK`
///
/// An all-zero waveform is returned unscaled.
pub fn normalized_interleave(samples: &[Complex64]) -> Vec<f64> {
    let values: Vec<f64> = samples.iter().flat_map(|s| [s.re, s.im]).collect();
    let peak = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak > 0.0 {
        let scale = TX_PEAK / peak;
        values.into_iter().map(|v| v * scale).collect()
    } else {
        values
    }
}

/// Write a transmit waveform as normalized text, one value per line
pub fn write_text<W: Write>(writer: &mut W, samples: &[Complex64]) -> Result<()> {
    for v in normalized_interleave(samples) {
        writeln!(writer, "{:.18e}", v)?;
    }
    Ok(())
}

/// Write a transmit waveform as normalized binary samples
///
/// `Sc16` maps the normalized values to full scale (×32767) with saturation.
pub fn write_samples<W: Write>(writer: &mut W, samples: &[Complex64], format: SampleFormat) -> Result<()> {
    let values = normalized_interleave(samples);
    let mut bytes = Vec::with_capacity(values.len() * format.bytes_per_value());
    match format {
        SampleFormat::Fc32 => {
            for v in values {
                bytes.extend_from_slice(&(v as f32).to_le_bytes());
            }
        }
        SampleFormat::Sc16 => {
            for v in values {
                bytes.extend_from_slice(&quantize_sc16(v).to_le_bytes());
            }
        }
    }
    writer.write_all(&bytes)?;
    Ok(())
}
