//! Configuration module for nyquistlab

mod lab;

pub use lab::{
    validate_tone, FilterSettings, LabConfig, TONE_DURATION_RANGE, TONE_FREQUENCY_RANGE,
};
