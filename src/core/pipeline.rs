// src/core/pipeline.rs
//
// The two demonstrations, end to end. Every call starts from the signal it is
// handed; nothing is cached between calls.

use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{FilterSettings, LabConfig};
use crate::core::decoder::decode_file;
use crate::core::dsp::filters::{apply_filter, design_filter, FilterCoefficients, FilterSpec};
use crate::core::dsp::response::{frequency_response, FrequencyResponse};
use crate::core::dsp::{estimate_dominant_frequency, magnitude_spectrum, magnitude_to_db, Spectrum};
use crate::core::encoder::write_wav;
use crate::core::sampling::{
    derive_scenarios, simulate_sampling, SampledSignal, SamplingRatios, SamplingScenario,
    ScenarioOverrides,
};
use crate::core::signal::{Signal, ToneSpec};
use crate::core::visualization::{
    render_response, render_sampling_demo, render_spectra, render_waveform,
};
use crate::error::Result;

/// Where the demonstration signal comes from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Decode an audio file
    File(PathBuf),
    /// Synthesize a sinusoid
    Tone(ToneSpec),
}

impl InputSource {
    pub fn load(&self) -> Result<Signal> {
        match self {
            InputSource::File(path) => {
                info!("Loading {}", path.display());
                decode_file(path)
            }
            InputSource::Tone(tone) => {
                info!(
                    "Generating {:.1} Hz tone for {:.2} s at {} Hz",
                    tone.frequency_hz, tone.duration_secs, tone.sample_rate
                );
                tone.generate()
            }
        }
    }
}

/// One scenario of the sampling demonstration
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario: SamplingScenario,
    pub sampled: SampledSignal,
    /// Dominant frequency of the reconstruction; differs from the source when aliased
    pub reconstructed_frequency: f64,
}

/// Sampling demonstration results
#[derive(Debug, Clone)]
pub struct SamplingDemo {
    pub dominant_frequency: f64,
    pub outcomes: Vec<ScenarioOutcome>,
}

/// Estimate the dominant frequency, derive the three scenarios, and sample
/// and reconstruct the signal at each rate.
pub fn run_sampling_demo(
    signal: &Signal,
    ratios: &SamplingRatios,
    overrides: &ScenarioOverrides,
) -> Result<SamplingDemo> {
    let dominant_frequency = estimate_dominant_frequency(signal)?;
    let scenarios = derive_scenarios(dominant_frequency, ratios, overrides)?;

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let sampled = simulate_sampling(signal, scenario.target_rate)?;
        let reconstructed_frequency = estimate_dominant_frequency(&sampled.reconstructed)?;
        info!(
            "{} at {} Hz (effective {:.1} Hz): reconstruction peaks at {:.2} Hz",
            scenario.kind.title(),
            scenario.target_rate,
            sampled.effective_rate(),
            reconstructed_frequency
        );
        outcomes.push(ScenarioOutcome {
            scenario,
            sampled,
            reconstructed_frequency,
        });
    }

    Ok(SamplingDemo {
        dominant_frequency,
        outcomes,
    })
}

/// Filter demonstration results
#[derive(Debug, Clone)]
pub struct FilterDemo {
    pub spec: FilterSpec,
    pub coefficients: FilterCoefficients,
    pub filtered: Signal,
    pub response: FrequencyResponse,
    pub original_spectrum: Spectrum,
    pub filtered_spectrum: Spectrum,
}

impl FilterDemo {
    /// Drop in spectral peak from original to filtered, in dB
    pub fn peak_reduction_db(&self) -> f64 {
        let before = self.original_spectrum.peak().map_or(0.0, |(_, m)| m);
        let after = self.filtered_spectrum.peak().map_or(0.0, |(_, m)| m);
        magnitude_to_db(before) - magnitude_to_db(after)
    }
}

/// Design the filter for the signal's Nyquist frequency, apply it, and
/// compute the response and both spectra.
pub fn run_filter_demo(signal: &Signal, spec: &FilterSpec, settings: &FilterSettings) -> Result<FilterDemo> {
    let nyquist = signal.nyquist();
    let coefficients = design_filter(spec, nyquist)?;
    let filtered = apply_filter(&coefficients, signal)?;
    let response = frequency_response(&coefficients, settings.response_points, nyquist)?;
    let original_spectrum = magnitude_spectrum(signal, settings.pad_spectrum)?;
    let filtered_spectrum = magnitude_spectrum(&filtered, settings.pad_spectrum)?;

    let demo = FilterDemo {
        spec: *spec,
        coefficients,
        filtered,
        response,
        original_spectrum,
        filtered_spectrum,
    };
    info!(
        "Applied {}: spectral peak reduced by {:.1} dB",
        spec.kind,
        demo.peak_reduction_db()
    );
    Ok(demo)
}

/// Files written for a demonstration
#[derive(Debug, Clone, Default, Serialize)]
pub struct Artifacts {
    pub audio: Vec<PathBuf>,
    pub plots: Vec<PathBuf>,
}

/// Write the original and each reconstruction as WAV, plus figures when asked
pub fn export_sampling_demo(
    original: &Signal,
    demo: &SamplingDemo,
    config: &LabConfig,
    output_dir: &Path,
    plots: bool,
) -> Result<Artifacts> {
    std::fs::create_dir_all(output_dir)?;
    let mut artifacts = Artifacts::default();

    let path = output_dir.join("original.wav");
    write_wav(original, &path)?;
    artifacts.audio.push(path);

    for outcome in &demo.outcomes {
        let path = output_dir.join(format!("{}.wav", outcome.scenario.kind.name()));
        write_wav(&outcome.sampled.reconstructed, &path)?;
        artifacts.audio.push(path);
    }

    if plots {
        let path = output_dir.join("original.png");
        render_waveform(original, &config.plot, &path)?;
        artifacts.plots.push(path);

        let panels: Vec<(SamplingScenario, &SampledSignal)> = demo
            .outcomes
            .iter()
            .map(|o| (o.scenario, &o.sampled))
            .collect();
        let path = output_dir.join("sampling.png");
        render_sampling_demo(original, &panels, &config.plot, &path)?;
        artifacts.plots.push(path);
    }

    Ok(artifacts)
}

/// Write the filtered signal as WAV, plus spectrum and response figures when asked
pub fn export_filter_demo(
    demo: &FilterDemo,
    config: &LabConfig,
    output_dir: &Path,
    plots: bool,
) -> Result<Artifacts> {
    std::fs::create_dir_all(output_dir)?;
    let mut artifacts = Artifacts::default();

    let path = output_dir.join("filtered.wav");
    write_wav(&demo.filtered, &path)?;
    artifacts.audio.push(path);

    if plots {
        let path = output_dir.join("spectra.png");
        render_spectra(&demo.original_spectrum, &demo.filtered_spectrum, &config.plot, &path)?;
        artifacts.plots.push(path);

        let path = output_dir.join("response.png");
        render_response(&demo.response, &config.plot, &path)?;
        artifacts.plots.push(path);
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampling::ScenarioKind;

    #[test]
    fn test_sampling_demo_flags_aliasing() {
        let tone = ToneSpec::new(1000.0, 1.0).generate().unwrap();
        let demo = run_sampling_demo(&tone, &SamplingRatios::default(), &ScenarioOverrides::default())
            .unwrap();

        assert!((demo.dominant_frequency - 1000.0).abs() <= 1.0);
        assert_eq!(demo.outcomes.len(), 3);

        let under = &demo.outcomes[0];
        assert_eq!(under.scenario.kind, ScenarioKind::Undersampling);
        assert!((under.reconstructed_frequency - 1000.0).abs() > 100.0);

        let over = &demo.outcomes[2];
        assert_eq!(over.scenario.kind, ScenarioKind::Oversampling);
        assert!((over.reconstructed_frequency - 1000.0).abs() <= 1.0);
    }

    #[test]
    fn test_input_source_tone() {
        let signal = InputSource::Tone(ToneSpec::new(250.0, 1.0)).load().unwrap();
        assert_eq!(signal.len(), 44100);

        let missing = InputSource::File(PathBuf::from("/nonexistent/nyquistlab.wav")).load();
        assert!(missing.is_err());
    }

    #[test]
    fn test_filter_demo_highpass_keeps_tone() {
        let tone = ToneSpec::new(2000.0, 1.0).generate().unwrap();
        let demo = run_filter_demo(&tone, &FilterSpec::highpass(500.0), &FilterSettings::default())
            .unwrap();
        assert_eq!(demo.filtered.len(), tone.len());
        assert!(demo.peak_reduction_db().abs() < 0.5);
        assert_eq!(demo.response.frequencies.len(), 8000);
    }
}
