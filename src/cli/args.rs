//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{validate_tone, LabConfig};
use crate::core::pipeline::InputSource;
use crate::core::sampling::ScenarioOverrides;
use crate::core::dsp::filters::{FilterKind, FilterSpec};
use crate::error::{LabError, Result};

#[derive(Parser, Debug)]
#[command(name = "nyquistlab")]
#[command(version, about = "Demonstrate the sampling theorem and Butterworth filtering on audio")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Lab configuration file (JSON); missing fields use defaults
    #[arg(short, long, global = true, env = "NYQUISTLAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample a signal below, at and above its dominant frequency and reconstruct it
    Sample(SampleArgs),
    /// Apply a Butterworth filter and compare spectra
    Filter(FilterArgs),
    /// Print a filter's frequency response
    Response(ResponseArgs),
}

/// Signal source shared by the demonstrations
#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
    /// Audio file to analyze; a tone is generated when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Tone frequency in Hz (50-5000)
    #[arg(long, conflicts_with = "input")]
    pub frequency: Option<f64>,

    /// Tone duration in seconds (1-5)
    #[arg(long, conflicts_with = "input")]
    pub duration: Option<f64>,
}

impl InputArgs {
    pub fn source(&self, config: &LabConfig) -> Result<InputSource> {
        if let Some(path) = &self.input {
            return Ok(InputSource::File(path.clone()));
        }

        let mut tone = config.tone;
        if let Some(frequency) = self.frequency {
            tone.frequency_hz = frequency;
        }
        if let Some(duration) = self.duration {
            tone.duration_secs = duration;
        }
        validate_tone(&tone)?;
        Ok(InputSource::Tone(tone))
    }
}

#[derive(ClapArgs, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Undersampling rate in Hz (default: dominant / 1.5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub under: Option<u32>,

    /// Critical sampling rate in Hz (default: dominant)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub critical: Option<u32>,

    /// Oversampling rate in Hz (default: 2.5 x dominant)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub over: Option<u32>,

    /// Output directory for WAV files and plots
    #[arg(short, long, default_value = "nyquistlab-out")]
    pub output: PathBuf,

    /// Also render PNG plots
    #[arg(short, long)]
    pub plots: bool,
}

impl SampleArgs {
    pub fn overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            undersampling: self.under,
            critical: self.critical,
            oversampling: self.over,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFamily {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Filter family and cutoffs
#[derive(ClapArgs, Debug, Clone)]
pub struct FilterSelection {
    /// Filter family
    #[arg(short, long, value_enum, default_value = "lowpass")]
    pub kind: FilterFamily,

    /// Cutoff in Hz for low-pass and high-pass
    #[arg(long)]
    pub cutoff: Option<f64>,

    /// Lower band edge in Hz for band-pass
    #[arg(long)]
    pub low: Option<f64>,

    /// Upper band edge in Hz for band-pass
    #[arg(long)]
    pub high: Option<f64>,
}

impl FilterSelection {
    pub fn spec(&self) -> Result<FilterSpec> {
        let kind = match self.kind {
            FilterFamily::Lowpass => FilterKind::Lowpass {
                cutoff: required(self.cutoff, "--cutoff")?,
            },
            FilterFamily::Highpass => FilterKind::Highpass {
                cutoff: required(self.cutoff, "--cutoff")?,
            },
            FilterFamily::Bandpass => FilterKind::Bandpass {
                low: required(self.low, "--low")?,
                high: required(self.high, "--high")?,
            },
        };
        Ok(FilterSpec::new(kind))
    }
}

fn required(value: Option<f64>, flag: &str) -> Result<f64> {
    value.ok_or_else(|| LabError::invalid(format!("{} is required for this filter", flag)))
}

#[derive(ClapArgs, Debug)]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterSelection,

    /// Output directory for the filtered WAV and plots
    #[arg(short, long, default_value = "nyquistlab-out")]
    pub output: PathBuf,

    /// Also render PNG plots
    #[arg(short, long)]
    pub plots: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ResponseArgs {
    #[command(flatten)]
    pub filter: FilterSelection,

    /// Sample rate the filter is designed for
    #[arg(short, long, default_value = "44100")]
    pub sample_rate: u32,

    /// Frequencies in Hz to report (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0])]
    pub at: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_defaults() {
        let args = Args::try_parse_from(["nyquistlab", "sample"]).unwrap();
        match args.command {
            Command::Sample(sample) => {
                assert!(sample.input.input.is_none());
                assert_eq!(sample.overrides(), ScenarioOverrides::default());
                assert_eq!(sample.output, PathBuf::from("nyquistlab-out"));

                let source = sample.input.source(&LabConfig::default()).unwrap();
                assert!(matches!(source, InputSource::Tone(t) if t.frequency_hz == 1000.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_overrides_and_tone() {
        let args = Args::try_parse_from([
            "nyquistlab", "sample", "--frequency", "440", "--duration", "3", "--under", "300", "--json",
        ])
        .unwrap();
        assert!(args.json);
        let Command::Sample(sample) = args.command else {
            panic!("expected sample");
        };
        assert_eq!(sample.overrides().undersampling, Some(300));
        assert_eq!(sample.overrides().critical, None);
        match sample.input.source(&LabConfig::default()).unwrap() {
            InputSource::Tone(tone) => {
                assert_eq!(tone.frequency_hz, 440.0);
                assert_eq!(tone.duration_secs, 3.0);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_zero_rate_and_bad_tone_rejected() {
        assert!(Args::try_parse_from(["nyquistlab", "sample", "--over", "0"]).is_err());

        let args = Args::try_parse_from(["nyquistlab", "sample", "--frequency", "20"]).unwrap();
        let Command::Sample(sample) = args.command else {
            panic!("expected sample");
        };
        assert!(sample.input.source(&LabConfig::default()).is_err());
    }

    #[test]
    fn test_filter_selection() {
        let args = Args::try_parse_from([
            "nyquistlab", "filter", "-i", "in.wav", "--kind", "bandpass", "--low", "300", "--high", "3000",
        ])
        .unwrap();
        let Command::Filter(filter) = args.command else {
            panic!("expected filter");
        };
        assert_eq!(filter.filter.spec().unwrap(), FilterSpec::bandpass(300.0, 3000.0));

        let missing = FilterSelection {
            kind: FilterFamily::Lowpass,
            cutoff: None,
            low: None,
            high: None,
        };
        assert!(matches!(missing.spec(), Err(LabError::InvalidInput(_))));
    }

    #[test]
    fn test_response_frequencies() {
        let args = Args::try_parse_from([
            "nyquistlab", "response", "--cutoff", "500", "--at", "100,1000",
        ])
        .unwrap();
        let Command::Response(response) = args.command else {
            panic!("expected response");
        };
        assert_eq!(response.at, vec![100.0, 1000.0]);
        assert_eq!(response.sample_rate, 44100);
    }
}
