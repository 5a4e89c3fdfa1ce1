//! Signal analysis, sampling, filtering and the audio boundaries around them

pub mod decoder;
pub mod dsp;
pub mod encoder;
pub mod pipeline;
pub mod sampling;
pub mod signal;
pub mod visualization;

pub use dsp::filters::{apply_filter, design_filter, FilterCoefficients, FilterKind, FilterSpec, FILTER_ORDER};
pub use dsp::response::{frequency_response, FrequencyResponse};
pub use dsp::{estimate_dominant_frequency, magnitude_spectrum, Spectrum};
pub use pipeline::{
    run_filter_demo, run_sampling_demo, Artifacts, FilterDemo, InputSource, SamplingDemo,
    ScenarioOutcome,
};
pub use sampling::{
    derive_scenarios, simulate_sampling, SampledSignal, SamplingRatios, SamplingScenario,
    ScenarioKind, ScenarioOverrides,
};
pub use signal::{Signal, ToneSpec};
