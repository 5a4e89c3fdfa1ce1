//! Butterworth filter design and zero-phase filtering
//!
//! Design goes through the analog prototype: Butterworth poles on the unit
//! circle, frequency transformation to the requested band, then the bilinear
//! transform with prewarped edges. The resulting zeros/poles/gain are expanded
//! into transfer-function coefficients `(b, a)` with `a[0] == 1`.

use log::{debug, warn};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::signal::Signal;
use crate::error::{LabError, Result};

/// Butterworth order used for every design
pub const FILTER_ORDER: usize = 6;

/// Filter family together with its cutoff frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterKind {
    Lowpass { cutoff: f64 },
    Highpass { cutoff: f64 },
    Bandpass { low: f64, high: f64 },
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Lowpass { .. } => "low-pass",
            FilterKind::Highpass { .. } => "high-pass",
            FilterKind::Bandpass { .. } => "band-pass",
        }
    }

    /// Cutoff frequencies in ascending order
    pub fn cutoffs(&self) -> Vec<f64> {
        match *self {
            FilterKind::Lowpass { cutoff } | FilterKind::Highpass { cutoff } => vec![cutoff],
            FilterKind::Bandpass { low, high } => vec![low, high],
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            FilterKind::Lowpass { cutoff } | FilterKind::Highpass { cutoff } => {
                write!(f, "{} @ {:.1} Hz", self.name(), cutoff)
            }
            FilterKind::Bandpass { low, high } => {
                write!(f, "{} {:.1}-{:.1} Hz", self.name(), low, high)
            }
        }
    }
}

/// Filter request: a family, its cutoffs, and the fixed design order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
}

impl FilterSpec {
    pub fn new(kind: FilterKind) -> Self {
        Self { kind }
    }

    pub fn lowpass(cutoff: f64) -> Self {
        Self::new(FilterKind::Lowpass { cutoff })
    }

    pub fn highpass(cutoff: f64) -> Self {
        Self::new(FilterKind::Highpass { cutoff })
    }

    pub fn bandpass(low: f64, high: f64) -> Self {
        Self::new(FilterKind::Bandpass { low, high })
    }

    pub fn order(&self) -> usize {
        FILTER_ORDER
    }
}

/// Transfer-function coefficients, numerator `b` and denominator `a`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    /// Wrap raw coefficients, normalizing so that `a[0] == 1`
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(LabError::invalid("filter coefficients must not be empty"));
        }
        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(LabError::invalid("leading denominator coefficient must be non-zero"));
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(LabError::numerical("filter coefficients are not finite"));
        }

        Ok(Self {
            b: b.iter().map(|c| c / a0).collect(),
            a: a.iter().map(|c| c / a0).collect(),
        })
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Number of coefficients per polynomial after padding to equal length
    pub fn len(&self) -> usize {
        self.b.len().max(self.a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty() && self.a.is_empty()
    }

    /// Schur-Cohn step-down test: true when every pole lies strictly inside
    /// the unit circle.
    pub fn is_stable(&self) -> bool {
        let mut poly = self.a.clone();
        while poly.len() > 1 {
            let m = poly.len() - 1;
            let k = poly[m];
            if !k.is_finite() || k.abs() >= 1.0 {
                return false;
            }
            let denom = 1.0 - k * k;
            poly = (0..m).map(|i| (poly[i] - k * poly[m - i]) / denom).collect();
        }
        true
    }

    /// Gain at z = 1
    pub fn dc_gain(&self) -> Option<f64> {
        let sum_a: f64 = self.a.iter().sum();
        if sum_a.abs() < f64::EPSILON {
            None
        } else {
            Some(self.b.iter().sum::<f64>() / sum_a)
        }
    }
}

/// Design a Butterworth filter of order `FILTER_ORDER` for the given Nyquist
/// frequency.
pub fn design_filter(spec: &FilterSpec, nyquist: f64) -> Result<FilterCoefficients> {
    if !(nyquist > 0.0) || !nyquist.is_finite() {
        return Err(LabError::invalid(format!(
            "Nyquist frequency must be positive, got {}",
            nyquist
        )));
    }

    let normalized: Vec<f64> = spec.kind.cutoffs().iter().map(|c| c / nyquist).collect();
    for (&wn, cutoff) in normalized.iter().zip(spec.kind.cutoffs()) {
        if !(wn > 0.0 && wn < 1.0) {
            return Err(LabError::invalid(format!(
                "cutoff {} Hz must lie strictly between 0 and the Nyquist frequency {} Hz",
                cutoff, nyquist
            )));
        }
    }
    if let FilterKind::Bandpass { low, high } = spec.kind {
        if low >= high {
            return Err(LabError::invalid(format!(
                "band-pass low cutoff {} Hz must be below high cutoff {} Hz",
                low, high
            )));
        }
    }

    let order = spec.order();
    let prototype = butterworth_prototype(order);
    // Prewarp for a bilinear transform with fs = 2 (normalized frequencies)
    let warp = |wn: f64| 4.0 * (PI * wn / 2.0).tan();

    let analog = match spec.kind {
        FilterKind::Lowpass { .. } => prototype.lowpass(warp(normalized[0])),
        FilterKind::Highpass { .. } => prototype.highpass(warp(normalized[0])),
        FilterKind::Bandpass { .. } => {
            let (w1, w2) = (warp(normalized[0]), warp(normalized[1]));
            prototype.bandpass((w1 * w2).sqrt(), w2 - w1)
        }
    };

    let digital = analog.bilinear(2.0);

    let max_radius = digital.poles.iter().map(|p| p.norm()).fold(0.0f64, f64::max);
    debug!(
        "Designed order-{} Butterworth {} (max pole radius {:.6})",
        order, spec.kind, max_radius
    );
    if !(max_radius < 1.0) {
        return Err(LabError::numerical(format!(
            "designed {} filter has a pole at radius {:.6}",
            spec.kind.name(),
            max_radius
        )));
    }

    let coefficients = digital.into_coefficients()?;
    if !coefficients.is_stable() {
        return Err(LabError::numerical(format!(
            "{} coefficients are unstable after expansion; cutoff too close to 0 or Nyquist",
            spec.kind.name()
        )));
    }
    Ok(coefficients)
}

/// Forward-backward filtering with odd extension at both ends.
///
/// Output length equals input length and the net phase shift is zero.
pub fn apply_filter(coefficients: &FilterCoefficients, signal: &Signal) -> Result<Signal> {
    if !coefficients.is_stable() {
        return Err(LabError::numerical("filter has poles on or outside the unit circle"));
    }

    let x = signal.samples();
    let n = x.len();
    let wanted_pad = 3 * coefficients.len();
    let pad = wanted_pad.min(n - 1);
    if pad < wanted_pad {
        warn!(
            "Signal of {} samples is shorter than the {}-sample edge padding, using {}",
            n, wanted_pad, pad
        );
    }

    let extended = odd_extend(x, pad);
    let zi = steady_state_initial(coefficients)?;

    let scaled: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut forward = lfilter(coefficients, &extended, Some(&scaled));

    forward.reverse();
    let scaled: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
    let mut backward = lfilter(coefficients, &forward, Some(&scaled));
    backward.reverse();

    let filtered: Vec<f64> = backward[pad..pad + n].to_vec();
    if filtered.iter().any(|s| !s.is_finite()) {
        return Err(LabError::numerical("filtering produced non-finite samples"));
    }

    signal.with_samples(filtered)
}

/// Direct Form II transposed IIR filter over a block.
///
/// `zi` seeds the delay line (length `len - 1`); `None` starts from rest.
pub fn lfilter(coefficients: &FilterCoefficients, input: &[f64], zi: Option<&[f64]>) -> Vec<f64> {
    let order = coefficients.len();
    let b = padded(coefficients.b(), order);
    let a = padded(coefficients.a(), order);

    let mut state = vec![0.0; order - 1];
    if let Some(zi) = zi {
        for (s, &z) in state.iter_mut().zip(zi) {
            *s = z;
        }
    }

    let mut output = Vec::with_capacity(input.len());
    for &x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..state.len() {
            let next = state.get(i + 1).copied().unwrap_or(0.0);
            state[i] = b[i + 1] * x - a[i + 1] * y + next;
        }
        output.push(y);
    }
    output
}

/// Delay-line state of the step response in steady state
fn steady_state_initial(coefficients: &FilterCoefficients) -> Result<Vec<f64>> {
    let order = coefficients.len();
    let b = padded(coefficients.b(), order);
    let a = padded(coefficients.a(), order);

    let gain = coefficients
        .dc_gain()
        .ok_or_else(|| LabError::numerical("filter has a pole at DC"))?;

    let mut zi = vec![0.0; order - 1];
    let mut acc = 0.0;
    for i in (0..order - 1).rev() {
        acc += b[i + 1] - a[i + 1] * gain;
        zi[i] = acc;
    }
    Ok(zi)
}

fn padded(coeffs: &[f64], len: usize) -> Vec<f64> {
    let mut out = coeffs.to_vec();
    out.resize(len, 0.0);
    out
}

/// Reflect `pad` samples about each endpoint (point symmetry)
fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    out
}

/// Zeros, poles and gain of an analog or digital filter
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

/// Analog Butterworth prototype with unit cutoff
fn butterworth_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| {
            let m = -(n - 1.0) + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();

    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

impl Zpk {
    fn relative_degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }

    fn lowpass(self, wo: f64) -> Zpk {
        let degree = self.relative_degree();
        Zpk {
            zeros: self.zeros.iter().map(|&z| z * wo).collect(),
            poles: self.poles.iter().map(|&p| p * wo).collect(),
            gain: self.gain * wo.powi(degree as i32),
        }
    }

    fn highpass(self, wo: f64) -> Zpk {
        let degree = self.relative_degree();
        let prod_z: Complex64 = self.zeros.iter().map(|&z| -z).product();
        let prod_p: Complex64 = self.poles.iter().map(|&p| -p).product();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|&z| wo / z).collect();
        zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

        Zpk {
            zeros,
            poles: self.poles.iter().map(|&p| wo / p).collect(),
            gain: self.gain * (prod_z / prod_p).re,
        }
    }

    fn bandpass(self, wo: f64, bw: f64) -> Zpk {
        let degree = self.relative_degree();
        let split = |roots: &[Complex64]| -> Vec<Complex64> {
            let scaled: Vec<Complex64> = roots.iter().map(|&r| r * bw / 2.0).collect();
            let offsets: Vec<Complex64> = scaled.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
            scaled
                .iter()
                .zip(&offsets)
                .map(|(&r, &d)| r + d)
                .chain(scaled.iter().zip(&offsets).map(|(&r, &d)| r - d))
                .collect()
        };

        let mut zeros = split(&self.zeros);
        zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

        Zpk {
            zeros,
            poles: split(&self.poles),
            gain: self.gain * bw.powi(degree as i32),
        }
    }

    /// Bilinear transform at sample rate `fs`; zeros at infinity map to z = -1
    fn bilinear(self, fs: f64) -> Zpk {
        let degree = self.relative_degree();
        let fs2 = Complex64::new(2.0 * fs, 0.0);

        let prod_z: Complex64 = self.zeros.iter().map(|&z| fs2 - z).product();
        let prod_p: Complex64 = self.poles.iter().map(|&p| fs2 - p).product();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
        zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

        Zpk {
            zeros,
            poles: self.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect(),
            gain: self.gain * (prod_z / prod_p).re,
        }
    }

    fn into_coefficients(self) -> Result<FilterCoefficients> {
        let b: Vec<f64> = poly(&self.zeros).iter().map(|c| c.re * self.gain).collect();
        let a: Vec<f64> = poly(&self.poles).iter().map(|c| c.re).collect();
        FilterCoefficients::new(b, a)
    }
}

/// Monic polynomial coefficients (highest power first) from its roots
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}
