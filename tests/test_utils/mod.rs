#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use uuid::Uuid;

use nyquistlab::core::{Signal, ToneSpec};

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_nyquistlab"))
}

pub fn run_nyquistlab<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute nyquistlab")
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "nyquistlab failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Fresh directory under the system temp dir, removed on drop
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub fn tone(frequency_hz: f64, duration_secs: f64) -> Signal {
    ToneSpec::new(frequency_hz, duration_secs)
        .generate()
        .expect("Failed to generate tone")
}

/// Sum of two equal-amplitude sinusoids at 44.1 kHz
pub fn two_tones(low_hz: f64, high_hz: f64, duration_secs: f64) -> Signal {
    let low = tone(low_hz, duration_secs);
    let high = tone(high_hz, duration_secs);
    let mixed = low
        .samples()
        .iter()
        .zip(high.samples())
        .map(|(a, b)| a + b)
        .collect();
    Signal::new(mixed, low.sample_rate()).expect("Failed to build signal")
}

/// Largest magnitude within `width_hz` of `hz`, in dB
pub fn band_level_db(signal: &Signal, hz: f64, width_hz: f64) -> f64 {
    let spectrum = nyquistlab::core::magnitude_spectrum(signal, true).expect("spectrum");
    let peak = spectrum
        .frequencies
        .iter()
        .zip(&spectrum.magnitudes)
        .filter(|(f, _)| (**f - hz).abs() <= width_hz)
        .map(|(_, &m)| m)
        .fold(0.0f64, f64::max);
    nyquistlab::core::dsp::magnitude_to_db(peak)
}
