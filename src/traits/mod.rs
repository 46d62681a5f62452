//! Core DSP traits for the OFDM PHY
//!
//! Each trait is one orthogonal axis of the signal chain: how bits become
//! subcarrier symbols, and how a timing metric is accumulated.

mod constellation;
mod metric;

pub use constellation::Constellation;
pub use metric::{MetricTrace, TimingMetric};
