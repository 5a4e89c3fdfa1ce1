//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::core::dsp::filters::FilterSpec;
use crate::core::dsp::response::FrequencyResponse;
use crate::core::pipeline::{Artifacts, FilterDemo, SamplingDemo};
use crate::core::sampling::ScenarioKind;
use crate::core::signal::Signal;

/// Reconstructions whose peak moves by more than this fraction of the
/// dominant frequency are reported as aliased
const ALIAS_TOLERANCE: f64 = 0.02;

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub kind: ScenarioKind,
    pub target_rate: u32,
    pub stride: usize,
    pub effective_rate: f64,
    pub sample_count: usize,
    pub reconstructed_frequency: f64,
    pub aliased: bool,
}

#[derive(Debug, Serialize)]
pub struct SamplingReport {
    pub source: String,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub dominant_frequency: f64,
    pub scenarios: Vec<ScenarioReport>,
    pub artifacts: Artifacts,
}

impl SamplingReport {
    pub fn new(source: String, signal: &Signal, demo: &SamplingDemo, artifacts: Artifacts) -> Self {
        let tolerance = (demo.dominant_frequency * ALIAS_TOLERANCE).max(1.0);
        let scenarios = demo
            .outcomes
            .iter()
            .map(|o| ScenarioReport {
                kind: o.scenario.kind,
                target_rate: o.scenario.target_rate,
                stride: o.sampled.stride,
                effective_rate: o.sampled.effective_rate(),
                sample_count: o.sampled.sample_indices.len(),
                reconstructed_frequency: o.reconstructed_frequency,
                aliased: (o.reconstructed_frequency - demo.dominant_frequency).abs() > tolerance,
            })
            .collect();

        Self {
            source,
            sample_rate: signal.sample_rate(),
            duration_secs: signal.duration_secs(),
            dominant_frequency: demo.dominant_frequency,
            scenarios,
            artifacts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterReport {
    pub source: String,
    pub filter: FilterSpec,
    pub order: usize,
    pub b: Vec<f64>,
    pub a: Vec<f64>,
    pub stable: bool,
    pub original_peak_hz: f64,
    pub filtered_peak_hz: f64,
    pub peak_reduction_db: f64,
    pub artifacts: Artifacts,
}

impl FilterReport {
    pub fn new(source: String, demo: &FilterDemo, artifacts: Artifacts) -> Self {
        Self {
            source,
            filter: demo.spec,
            order: demo.spec.order(),
            b: demo.coefficients.b().to_vec(),
            a: demo.coefficients.a().to_vec(),
            stable: demo.coefficients.is_stable(),
            original_peak_hz: demo.original_spectrum.peak().map_or(0.0, |(f, _)| f),
            filtered_peak_hz: demo.filtered_spectrum.peak().map_or(0.0, |(f, _)| f),
            peak_reduction_db: demo.peak_reduction_db(),
            artifacts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponsePoint {
    pub frequency_hz: f64,
    pub gain_db: f64,
}

#[derive(Debug, Serialize)]
pub struct ResponseReport {
    pub filter: FilterSpec,
    pub sample_rate: u32,
    pub points: Vec<ResponsePoint>,
}

impl ResponseReport {
    /// Gains at the requested frequencies; those above Nyquist are skipped
    pub fn new(filter: FilterSpec, sample_rate: u32, response: &FrequencyResponse, at: &[f64]) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        let points = at
            .iter()
            .filter(|&&hz| (0.0..=nyquist).contains(&hz))
            .filter_map(|&hz| {
                response.gain_at(hz).map(|gain_db| ResponsePoint {
                    frequency_hz: hz,
                    gain_db,
                })
            })
            .collect();
        Self {
            filter,
            sample_rate,
            points,
        }
    }
}

/// Format sampling results for terminal output
pub fn format_sampling(report: &SamplingReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n", report.source.clone().cyan()));
    output.push_str(&format!(
        "  Sample Rate: {} Hz, Duration: {:.2}s\n",
        report.sample_rate, report.duration_secs
    ));
    output.push_str(&format!(
        "  Dominant Frequency: {:.2} Hz (Nyquist rate {:.0} Hz)\n\n",
        report.dominant_frequency,
        2.0 * report.dominant_frequency
    ));

    for scenario in &report.scenarios {
        let status = if scenario.aliased {
            "✗ ALIASED".red().to_string()
        } else {
            "✓ PRESERVED".green().to_string()
        };
        output.push_str(&format!(
            "  {:<14} {:>7} Hz  -> {:>9.2} Hz  {}\n",
            scenario.kind.name(),
            scenario.target_rate,
            scenario.reconstructed_frequency,
            status
        ));
        if verbose {
            output.push_str(&format!(
                "    stride {}, effective rate {:.1} Hz, {} samples kept\n",
                scenario.stride, scenario.effective_rate, scenario.sample_count
            ));
        }
    }

    output.push_str(&format_artifacts(&report.artifacts));
    output
}

/// Format filter results for terminal output
pub fn format_filter(report: &FilterReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n", report.source.clone().cyan()));
    output.push_str(&format!(
        "  Filter: {} (order {})\n",
        report.filter.kind, report.order
    ));
    output.push_str(&format!(
        "  Spectral Peak: {:.1} Hz -> {:.1} Hz\n",
        report.original_peak_hz, report.filtered_peak_hz
    ));

    let reduction = format!("{:.1} dB", report.peak_reduction_db);
    output.push_str(&format!(
        "  Peak Reduction: {}\n",
        if report.peak_reduction_db >= 3.0 {
            reduction.yellow().to_string()
        } else {
            reduction
        }
    ));

    if verbose {
        output.push_str(&format!("  b = {:?}\n", report.b));
        output.push_str(&format!("  a = {:?}\n", report.a));
        output.push_str(&format!("  Stable: {}\n", report.stable));
    }

    output.push_str(&format_artifacts(&report.artifacts));
    output
}

/// Format a response table for terminal output
pub fn format_response(report: &ResponseReport) -> String {
    let mut output = format!(
        "{} at {} Hz (order {})\n",
        report.filter.kind,
        report.sample_rate,
        report.filter.order()
    );
    for point in &report.points {
        output.push_str(&format!(
            "  {:>9.1} Hz  {:>9.2} dB\n",
            point.frequency_hz, point.gain_db
        ));
    }
    output
}

fn format_artifacts(artifacts: &Artifacts) -> String {
    let mut output = String::new();
    if artifacts.audio.is_empty() && artifacts.plots.is_empty() {
        return output;
    }
    output.push('\n');
    for path in artifacts.audio.iter().chain(&artifacts.plots) {
        output.push_str(&format!("  Saved: {}\n", path.display()));
    }
    output
}

/// Pretty JSON for any report
pub fn format_json<T: Serialize>(report: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
