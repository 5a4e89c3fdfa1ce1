// src/core/signal.rs
//
// Mono sample sequences and the tone generator that feeds the demonstrations.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{LabError, Result};

/// Mono audio: samples nominally in [-1.0, 1.0] plus their sample rate.
///
/// A `Signal` always holds at least one finite sample and a non-zero rate. Stages
/// never mutate a signal; they return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(LabError::invalid("signal must contain at least one sample"));
        }
        if sample_rate == 0 {
            return Err(LabError::invalid("sample rate must be positive"));
        }
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(LabError::invalid(format!(
                "sample {} is not a finite number ({})",
                i, samples[i]
            )));
        }
        Ok(Self { samples, sample_rate })
    }

    /// Average interleaved channels down to a single mono channel
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(LabError::invalid("audio reports 0 channels"));
        }

        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / channels as f64)
            .collect();

        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Time of each sample in seconds
    pub fn times(&self) -> Vec<f64> {
        let rate = self.sample_rate as f64;
        (0..self.samples.len()).map(|i| i as f64 / rate).collect()
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |acc, &s| acc.max(s.abs()))
    }

    /// Derive a signal with the same rate from new samples
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Result<Self> {
        Self::new(samples, self.sample_rate)
    }
}

/// Pure sinusoid generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSpec {
    pub frequency_hz: f64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub amplitude: f64,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 1000.0,
            duration_secs: 2.0,
            sample_rate: 44100,
            amplitude: 0.5,
        }
    }
}

impl ToneSpec {
    pub fn new(frequency_hz: f64, duration_secs: f64) -> Self {
        Self {
            frequency_hz,
            duration_secs,
            ..Default::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Synthesize `amplitude * sin(2*pi*f*t)` with `t = i / sample_rate`
    pub fn generate(&self) -> Result<Signal> {
        if !(self.frequency_hz > 0.0) || !self.frequency_hz.is_finite() {
            return Err(LabError::invalid(format!(
                "tone frequency must be positive, got {}",
                self.frequency_hz
            )));
        }
        if !(self.duration_secs > 0.0) || !self.duration_secs.is_finite() {
            return Err(LabError::invalid(format!(
                "tone duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if !(self.amplitude > 0.0) || !self.amplitude.is_finite() {
            return Err(LabError::invalid(format!(
                "tone amplitude must be positive, got {}",
                self.amplitude
            )));
        }

        let rate = self.sample_rate as f64;
        let len = (rate * self.duration_secs) as usize;
        let omega = 2.0 * PI * self.frequency_hz;

        let samples = (0..len)
            .map(|i| self.amplitude * (omega * i as f64 / rate).sin())
            .collect();

        Signal::new(samples, self.sample_rate)
    }
}
