// src/config/lab.rs
//
// Defaults for tone generation, sampling ratios, filtering and plotting

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::sampling::SamplingRatios;
use crate::core::signal::ToneSpec;
use crate::core::visualization::PlotConfig;
use crate::error::{LabError, Result};

/// Allowed tone frequencies in Hz
pub const TONE_FREQUENCY_RANGE: (f64, f64) = (50.0, 5000.0);
/// Allowed tone durations in seconds
pub const TONE_DURATION_RANGE: (f64, f64) = (1.0, 5.0);

/// Filter demonstration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Points used when sampling the frequency response
    pub response_points: usize,
    /// Zero-pad magnitude spectra to the next power of two
    pub pad_spectrum: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            response_points: 8000,
            pad_spectrum: true,
        }
    }
}

/// Complete lab configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub tone: ToneSpec,
    pub sampling: SamplingRatios,
    pub filter: FilterSettings,
    pub plot: PlotConfig,
}

impl LabConfig {
    /// Load a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        validate_tone(&self.tone)?;
        self.sampling.validate()?;
        if self.filter.response_points == 0 {
            return Err(LabError::invalid("filter.response_points must be positive"));
        }
        self.plot.validate()
    }
}

/// Tone parameters within the ranges the lab offers
pub fn validate_tone(tone: &ToneSpec) -> Result<()> {
    let (f_min, f_max) = TONE_FREQUENCY_RANGE;
    if !(tone.frequency_hz >= f_min && tone.frequency_hz <= f_max) {
        return Err(LabError::invalid(format!(
            "tone frequency {} Hz outside {}-{} Hz",
            tone.frequency_hz, f_min, f_max
        )));
    }
    let (d_min, d_max) = TONE_DURATION_RANGE;
    if !(tone.duration_secs >= d_min && tone.duration_secs <= d_max) {
        return Err(LabError::invalid(format!(
            "tone duration {} s outside {}-{} s",
            tone.duration_secs, d_min, d_max
        )));
    }
    if tone.sample_rate == 0 {
        return Err(LabError::invalid("tone sample rate must be positive"));
    }
    if !(tone.amplitude > 0.0 && tone.amplitude <= 1.0) {
        return Err(LabError::invalid(format!(
            "tone amplitude {} outside (0, 1]",
            tone.amplitude
        )));
    }
    Ok(())
}
