//! NyquistLab - Sampling theorem and digital filtering demonstrations
//!
//! A teaching toolkit that shows what happens when audio is sampled below,
//! at, and above the rate its content needs, and how a Butterworth filter
//! reshapes a signal's spectrum.
//!
//! ## Features
//!
//! - **Dominant frequency**: FFT magnitude peak over the non-negative bins
//! - **Sampling scenarios**: under (f/1.5), critical (f) and over (2.5f) rates,
//!   each overridable
//! - **Reconstruction**: decimation without anti-aliasing, then clamped linear
//!   interpolation back to the source grid
//! - **Filtering**: order-6 Butterworth low/high/band-pass, applied zero-phase
//! - **Response**: filter gain in dB and magnitude spectra for plotting
//! - **Audio**: decode anything Symphonia reads, write 16-bit PCM mono WAV
//!
//! ## Module Structure
//!
//! - `core` - Signal types, DSP, sampling, pipeline, decoding/encoding, plots
//! - `cli` - Command-line interface
//! - `config` - Lab defaults loaded from JSON
//! - `error` - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nyquistlab::core::{run_sampling_demo, SamplingRatios, ScenarioOverrides, ToneSpec};
//!
//! let tone = ToneSpec::new(1000.0, 2.0).generate()?;
//! let demo = run_sampling_demo(&tone, &SamplingRatios::default(), &ScenarioOverrides::default())?;
//!
//! for outcome in &demo.outcomes {
//!     println!("{}: {:.1} Hz", outcome.scenario.kind, outcome.reconstructed_frequency);
//! }
//! ```
//!
//! ## Scenarios
//!
//! | Scenario      | Default rate | Expected outcome                     |
//! |---------------|--------------|--------------------------------------|
//! | Undersampling | f / 1.5      | Aliased to a lower frequency         |
//! | Critical      | f            | Collapses to (near) DC               |
//! | Oversampling  | 2.5 f        | Original frequency preserved         |

// Core signal processing
pub mod core;

// Command-line interface
pub mod cli;

// Configuration
pub mod config;

// Errors
pub mod error;

// Re-export commonly used types at crate root for convenience
pub use config::LabConfig;
pub use error::{LabError, Result};
pub use crate::core::{
    apply_filter, design_filter, estimate_dominant_frequency, frequency_response,
    magnitude_spectrum, simulate_sampling, FilterCoefficients, FilterKind, FilterSpec,
    FrequencyResponse, SampledSignal, SamplingScenario, ScenarioKind, Signal, Spectrum, ToneSpec,
};
