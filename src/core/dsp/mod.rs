//! Digital Signal Processing utilities
//!
//! - spectrum estimation and dominant-frequency extraction (this module)
//! - Butterworth design and zero-phase filtering (`filters`)
//! - filter frequency response (`response`)

pub mod filters;
pub mod response;

use log::{debug, warn};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;

use crate::core::signal::Signal;
use crate::error::{LabError, Result};

/// Magnitudes at or below this are reported at the dB floor
pub const MIN_MAGNITUDE: f64 = 1e-10;

/// Convert a linear magnitude to decibels, flooring at `MIN_MAGNITUDE`
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * magnitude.max(MIN_MAGNITUDE).log10()
}

/// One-sided magnitude spectrum
#[derive(Debug, Clone, Serialize)]
pub struct Spectrum {
    /// Bin centre frequencies in Hz, starting at DC
    pub frequencies: Vec<f64>,
    /// |X[k]| for each retained bin
    pub magnitudes: Vec<f64>,
    /// Transform length the bins were computed with
    pub fft_size: usize,
}

impl Spectrum {
    /// Frequency and magnitude of the strongest bin (first one on ties);
    /// `None` for an empty spectrum
    pub fn peak(&self) -> Option<(f64, f64)> {
        let idx = argmax(&self.magnitudes)?;
        Some((*self.frequencies.get(idx)?, self.magnitudes[idx]))
    }

    pub fn bin_width(&self) -> f64 {
        if self.frequencies.len() > 1 {
            self.frequencies[1] - self.frequencies[0]
        } else {
            0.0
        }
    }

    pub fn magnitudes_db(&self) -> Vec<f64> {
        self.magnitudes.iter().map(|&m| magnitude_to_db(m)).collect()
    }
}

/// Frequency of the bin with the largest magnitude among the non-negative bins.
///
/// A silent signal peaks at DC and yields 0 Hz.
pub fn estimate_dominant_frequency(signal: &Signal) -> Result<f64> {
    if signal.len() < 2 {
        return Err(LabError::invalid(
            "dominant frequency needs at least 2 samples",
        ));
    }

    let spectrum = one_sided_spectrum(signal.samples(), signal.len(), signal.sample_rate());
    let (frequency, magnitude) = spectrum
        .peak()
        .ok_or_else(|| LabError::invalid("spectrum has no bins"))?;

    if magnitude <= MIN_MAGNITUDE {
        warn!("Signal is silent, dominant frequency defaults to DC");
    }
    debug!(
        "Dominant frequency {:.2} Hz (N = {}, bin width {:.3} Hz)",
        frequency,
        spectrum.fft_size,
        spectrum.bin_width()
    );

    Ok(frequency)
}

/// Full one-sided magnitude spectrum of a signal.
///
/// With `pad_to_pow2` the samples are zero-padded to the next power of two,
/// which only refines the frequency axis.
pub fn magnitude_spectrum(signal: &Signal, pad_to_pow2: bool) -> Result<Spectrum> {
    if signal.len() < 2 {
        return Err(LabError::invalid(
            "magnitude spectrum needs at least 2 samples",
        ));
    }

    let fft_size = if pad_to_pow2 {
        signal.len().next_power_of_two()
    } else {
        signal.len()
    };

    Ok(one_sided_spectrum(signal.samples(), fft_size, signal.sample_rate()))
}

/// Frequency of FFT bin `k` for an `n`-point transform, negative past n/2
pub fn bin_frequency(k: usize, n: usize, sample_rate: u32) -> f64 {
    let signed = if k < n.div_ceil(2) {
        k as f64
    } else {
        k as f64 - n as f64
    };
    signed * sample_rate as f64 / n as f64
}

/// Forward FFT of real samples, zero-padded to `fft_size`, keeping the
/// first `fft_size / 2` bins.
fn one_sided_spectrum(samples: &[f64], fft_size: usize, sample_rate: u32) -> Spectrum {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .take(fft_size)
        .map(|&s| Complex::new(s, 0.0))
        .collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    fft.process(&mut buffer);

    let half = fft_size / 2;
    let frequencies = (0..half)
        .map(|k| bin_frequency(k, fft_size, sample_rate))
        .collect();
    let magnitudes = buffer[..half].iter().map(|c| c.norm()).collect();

    Spectrum {
        frequencies,
        magnitudes,
        fft_size,
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    Some(best)
}
