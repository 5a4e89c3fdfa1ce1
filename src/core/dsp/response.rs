//! Filter frequency response

use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

use super::filters::FilterCoefficients;
use super::magnitude_to_db;
use crate::error::{LabError, Result};

/// Magnitude response sampled on `[0, pi)`, expressed in Hz and dB
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyResponse {
    pub frequencies: Vec<f64>,
    pub gain_db: Vec<f64>,
}

impl FrequencyResponse {
    /// Gain in dB at the sampled frequency nearest to `hz`
    pub fn gain_at(&self, hz: f64) -> Option<f64> {
        self.frequencies
            .iter()
            .zip(&self.gain_db)
            .min_by(|(fa, _), (fb, _)| (*fa - hz).abs().total_cmp(&(*fb - hz).abs()))
            .map(|(_, &g)| g)
    }
}

/// Evaluate `H(e^jw)` at `w_k = pi * k / n_points` for `k in 0..n_points`.
///
/// Angular frequencies map to Hz as `w * nyquist / pi`; magnitudes become
/// `20 * log10(|H|)`, floored at -200 dB.
pub fn frequency_response(
    coefficients: &FilterCoefficients,
    n_points: usize,
    nyquist: f64,
) -> Result<FrequencyResponse> {
    if n_points == 0 {
        return Err(LabError::invalid("frequency response needs at least one point"));
    }
    if !(nyquist > 0.0) || !nyquist.is_finite() {
        return Err(LabError::invalid(format!(
            "Nyquist frequency must be positive, got {}",
            nyquist
        )));
    }

    let mut frequencies = Vec::with_capacity(n_points);
    let mut gain_db = Vec::with_capacity(n_points);

    for k in 0..n_points {
        let w = PI * k as f64 / n_points as f64;
        let h = evaluate(coefficients.b(), w) / evaluate(coefficients.a(), w);
        // w * nyquist / pi, without the round trip through pi
        frequencies.push(k as f64 * nyquist / n_points as f64);
        gain_db.push(magnitude_to_db(h.norm()));
    }

    if gain_db.iter().any(|g| !g.is_finite()) {
        return Err(LabError::numerical("frequency response is not finite"));
    }

    Ok(FrequencyResponse { frequencies, gain_db })
}

/// Polynomial in z^-1 evaluated on the unit circle at angle `w`
fn evaluate(coeffs: &[f64], w: f64) -> Complex64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, &c)| c * Complex64::from_polar(1.0, -w * i as f64))
        .sum()
}
