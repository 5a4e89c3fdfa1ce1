//! Visualization tools for the demonstrations
//!
//! Renders waveforms, sampling reconstructions, magnitude spectra and filter
//! responses to PNG.

mod plot;

pub use plot::{
    render_response,
    render_sampling_demo,
    render_spectra,
    render_waveform,
    PlotConfig,
};
