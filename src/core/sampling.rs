// src/core/sampling.rs
//
// Sampling demonstration: pick every Nth sample and rebuild the signal by
// linear interpolation. There is deliberately no anti-aliasing filter, so
// rates below twice the signal frequency alias.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::signal::Signal;
use crate::error::{LabError, Result};

/// Which side of the Nyquist criterion a scenario demonstrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Undersampling,
    Critical,
    Oversampling,
}

impl ScenarioKind {
    pub fn all() -> [Self; 3] {
        [Self::Undersampling, Self::Critical, Self::Oversampling]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Undersampling => "undersampling",
            ScenarioKind::Critical => "critical",
            ScenarioKind::Oversampling => "oversampling",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScenarioKind::Undersampling => "Undersampling (Aliasing)",
            ScenarioKind::Critical => "Critical Sampling",
            ScenarioKind::Oversampling => "Oversampling (No Aliasing)",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Multipliers applied to the dominant frequency to derive default rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingRatios {
    /// Under-sampling rate is `f / under_divisor`
    pub under_divisor: f64,
    /// Critical rate is `f * critical_factor`
    pub critical_factor: f64,
    /// Over-sampling rate is `f * over_factor`
    pub over_factor: f64,
}

impl Default for SamplingRatios {
    fn default() -> Self {
        Self {
            under_divisor: 1.5,
            critical_factor: 1.0,
            over_factor: 2.5,
        }
    }
}

impl SamplingRatios {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("under_divisor", self.under_divisor),
            ("critical_factor", self.critical_factor),
            ("over_factor", self.over_factor),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(LabError::invalid(format!(
                    "sampling ratio {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// A named sampling rate to demonstrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingScenario {
    pub kind: ScenarioKind,
    pub target_rate: u32,
}

impl SamplingScenario {
    pub fn new(kind: ScenarioKind, target_rate: u32) -> Result<Self> {
        if target_rate < 1 {
            return Err(LabError::invalid(format!(
                "{} rate must be at least 1 Hz",
                kind
            )));
        }
        Ok(Self { kind, target_rate })
    }
}

/// Explicit user rates that replace the derived defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOverrides {
    pub undersampling: Option<u32>,
    pub critical: Option<u32>,
    pub oversampling: Option<u32>,
}

impl ScenarioOverrides {
    pub fn get(&self, kind: ScenarioKind) -> Option<u32> {
        match kind {
            ScenarioKind::Undersampling => self.undersampling,
            ScenarioKind::Critical => self.critical,
            ScenarioKind::Oversampling => self.oversampling,
        }
    }
}

/// Default rate for one scenario, truncated to whole Hz and clamped to >= 1
pub fn default_rate(kind: ScenarioKind, dominant_hz: f64, ratios: &SamplingRatios) -> u32 {
    let raw = match kind {
        ScenarioKind::Undersampling => dominant_hz / ratios.under_divisor,
        ScenarioKind::Critical => dominant_hz * ratios.critical_factor,
        ScenarioKind::Oversampling => dominant_hz * ratios.over_factor,
    };

    // `as` saturates: NaN and negatives become 0
    let rate = raw as u32;
    if rate < 1 {
        warn!(
            "Derived {} rate {:.3} Hz is below 1 Hz, clamping to 1 Hz",
            kind, raw
        );
        1
    } else {
        rate
    }
}

/// Under/critical/over scenarios for a dominant frequency, with overrides applied
pub fn derive_scenarios(
    dominant_hz: f64,
    ratios: &SamplingRatios,
    overrides: &ScenarioOverrides,
) -> Result<[SamplingScenario; 3]> {
    ratios.validate()?;

    let build = |kind: ScenarioKind| -> Result<SamplingScenario> {
        let rate = overrides
            .get(kind)
            .unwrap_or_else(|| default_rate(kind, dominant_hz, ratios));
        SamplingScenario::new(kind, rate)
    };

    Ok([
        build(ScenarioKind::Undersampling)?,
        build(ScenarioKind::Critical)?,
        build(ScenarioKind::Oversampling)?,
    ])
}

/// Result of sampling a signal at a lower rate and reconstructing it
#[derive(Debug, Clone)]
pub struct SampledSignal {
    /// Decimation stride actually used
    pub stride: usize,
    /// Positions of the retained samples in the source
    pub sample_indices: Vec<usize>,
    /// Retained sample values
    pub sampled_values: Vec<f64>,
    /// Full-length reconstruction at the source rate
    pub reconstructed: Signal,
}

impl SampledSignal {
    /// Rate the decimated samples really represent
    pub fn effective_rate(&self) -> f64 {
        self.reconstructed.sample_rate() as f64 / self.stride as f64
    }

    /// Time of each retained sample in seconds
    pub fn sample_times(&self) -> Vec<f64> {
        let rate = self.reconstructed.sample_rate() as f64;
        self.sample_indices.iter().map(|&i| i as f64 / rate).collect()
    }
}

/// Decimate `signal` for `target_rate` and rebuild it by clamped linear
/// interpolation onto the original sample grid.
///
/// The stride is `floor(sample_rate / target_rate)`, never less than 1, so
/// targets above the source rate reproduce the input.
pub fn simulate_sampling(signal: &Signal, target_rate: u32) -> Result<SampledSignal> {
    if target_rate < 1 {
        return Err(LabError::invalid("target sampling rate must be at least 1 Hz"));
    }

    let stride = ((signal.sample_rate() / target_rate) as usize).max(1);
    let sample_indices: Vec<usize> = (0..signal.len()).step_by(stride).collect();
    let sampled_values: Vec<f64> = sample_indices.iter().map(|&i| signal.samples()[i]).collect();

    debug!(
        "Sampling at {} Hz: stride {}, {} of {} samples kept",
        target_rate,
        stride,
        sample_indices.len(),
        signal.len()
    );

    let rate = signal.sample_rate() as f64;
    let known_times: Vec<f64> = sample_indices.iter().map(|&i| i as f64 / rate).collect();
    let query_times = signal.times();
    let reconstructed = signal.with_samples(interp(&query_times, &known_times, &sampled_values)?)?;

    Ok(SampledSignal {
        stride,
        sample_indices,
        sampled_values,
        reconstructed,
    })
}

/// Piecewise-linear interpolation of `(xp, fp)` at each `x`.
///
/// `xp` must be ascending, non-empty and as long as `fp`. Queries outside
/// `[xp[0], xp[last]]` hold the boundary values.
pub(crate) fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>> {
    if xp.is_empty() {
        return Err(LabError::invalid("interpolation needs at least one known point"));
    }
    if xp.len() != fp.len() {
        return Err(LabError::invalid(format!(
            "interpolation has {} positions but {} values",
            xp.len(),
            fp.len()
        )));
    }
    let last = xp.len() - 1;
    let mut seg = 0;

    let values = x
        .iter()
        .map(|&t| {
            if t <= xp[0] {
                return fp[0];
            }
            if t >= xp[last] {
                return fp[last];
            }
            while seg + 1 < last && xp[seg + 1] <= t {
                seg += 1;
            }
            // Queries are not required to be sorted
            while seg > 0 && xp[seg] > t {
                seg -= 1;
            }
            let (x0, x1) = (xp[seg], xp[seg + 1]);
            let frac = (t - x0) / (x1 - x0);
            fp[seg] + frac * (fp[seg + 1] - fp[seg])
        })
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signal::ToneSpec;

    #[test]
    fn test_default_rates() {
        let ratios = SamplingRatios::default();
        let scenarios = derive_scenarios(1000.0, &ratios, &ScenarioOverrides::default()).unwrap();
        let rates: Vec<u32> = scenarios.iter().map(|s| s.target_rate).collect();
        assert_eq!(rates, vec![666, 1000, 2500]);
        assert_eq!(scenarios[0].kind, ScenarioKind::Undersampling);
        assert_eq!(scenarios[2].kind, ScenarioKind::Oversampling);
    }

    #[test]
    fn test_overrides_and_clamping() {
        let ratios = SamplingRatios::default();
        let overrides = ScenarioOverrides {
            critical: Some(1234),
            ..Default::default()
        };
        let scenarios = derive_scenarios(0.0, &ratios, &overrides).unwrap();
        assert_eq!(scenarios[0].target_rate, 1);
        assert_eq!(scenarios[1].target_rate, 1234);
        assert_eq!(scenarios[2].target_rate, 1);

        let zero = ScenarioOverrides {
            oversampling: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            derive_scenarios(1000.0, &ratios, &zero),
            Err(LabError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_identity_at_source_rate() {
        let tone = ToneSpec::new(440.0, 0.05).generate().unwrap();
        let sampled = simulate_sampling(&tone, tone.sample_rate()).unwrap();
        assert_eq!(sampled.stride, 1);
        assert_eq!(sampled.reconstructed.samples(), tone.samples());

        // Above the source rate the stride is clamped to 1 as well
        let sampled = simulate_sampling(&tone, 96000).unwrap();
        assert_eq!(sampled.stride, 1);
        assert_eq!(sampled.reconstructed.len(), tone.len());
    }

    #[test]
    fn test_length_preserved() {
        let tone = ToneSpec::new(1000.0, 0.1).generate().unwrap();
        for rate in [1, 7, 666, 1000, 2500, 22050, 44100] {
            let sampled = simulate_sampling(&tone, rate).unwrap();
            assert_eq!(sampled.reconstructed.len(), tone.len(), "rate {}", rate);
            assert_eq!(sampled.reconstructed.sample_rate(), tone.sample_rate());
        }
    }

    #[test]
    fn test_zero_rate_rejected() {
        let tone = ToneSpec::new(1000.0, 0.1).generate().unwrap();
        assert!(matches!(simulate_sampling(&tone, 0), Err(LabError::InvalidInput(_))));
    }

    #[test]
    fn test_reconstruction_interpolates_and_holds() {
        let signal = Signal::new(vec![0.0, 9.0, 2.0, 9.0, 4.0, 9.0, 9.0], 6).unwrap();
        // 6 Hz source at 3 Hz: stride 2, keeps indices 0, 2, 4, 6
        let sampled = simulate_sampling(&signal, 3).unwrap();
        assert_eq!(sampled.stride, 2);
        assert_eq!(sampled.sample_indices, vec![0, 2, 4, 6]);
        assert_eq!(sampled.sampled_values, vec![0.0, 2.0, 4.0, 9.0]);

        let rebuilt = sampled.reconstructed.samples();
        let expected = [0.0, 1.0, 2.0, 3.0, 4.0, 6.5, 9.0];
        for (got, want) in rebuilt.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} vs {}", got, want);
        }
        assert!((sampled.effective_rate() - 3.0).abs() < 1e-12);
        assert!((sampled.sample_times()[1] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_tail_holds_last_sample() {
        // Last retained index is 3, indices 4 and 5 hold its value
        let signal = Signal::new(vec![1.0, 0.0, 0.0, 5.0, 7.0, 8.0], 3).unwrap();
        let sampled = simulate_sampling(&signal, 1).unwrap();
        assert_eq!(sampled.sample_indices, vec![0, 3]);
        let rebuilt = sampled.reconstructed.samples();
        assert!((rebuilt[4] - 5.0).abs() < 1e-12);
        assert!((rebuilt[5] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_interp_clamps_and_handles_unsorted_queries() {
        let xp = [1.0, 2.0, 4.0];
        let fp = [10.0, 20.0, 40.0];
        let out = interp(&[0.0, 3.0, 1.5, 5.0, 2.0], &xp, &fp).unwrap();
        assert_eq!(out, vec![10.0, 30.0, 15.0, 40.0, 20.0]);

        let single = interp(&[0.0, 1.0, 2.0], &[1.0], &[7.0]).unwrap();
        assert_eq!(single, vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_interp_rejects_missing_points() {
        assert!(matches!(interp(&[0.5], &[], &[]), Err(LabError::InvalidInput(_))));
        assert!(matches!(
            interp(&[0.5], &[0.0, 1.0], &[3.0]),
            Err(LabError::InvalidInput(_))
        ));
    }
}
