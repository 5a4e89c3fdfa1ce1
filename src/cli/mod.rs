// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{Args, Command, FilterArgs, FilterFamily, FilterSelection, InputArgs, ResponseArgs, SampleArgs};
pub use output::{
    format_filter, format_json, format_response, format_sampling, FilterReport, ResponsePoint,
    ResponseReport, SamplingReport, ScenarioReport,
};

use log::debug;

use crate::config::LabConfig;
use crate::core::dsp::filters::design_filter;
use crate::core::dsp::response::frequency_response;
use crate::core::pipeline::{
    export_filter_demo, export_sampling_demo, run_filter_demo, run_sampling_demo, InputSource,
};
use crate::error::Result;

/// Load the configuration named on the command line, or the defaults
pub fn load_config(args: &Args) -> Result<LabConfig> {
    match &args.config {
        Some(path) => {
            debug!("Reading configuration from {}", path.display());
            LabConfig::from_json_file(path)
        }
        None => Ok(LabConfig::default()),
    }
}

/// Run the parsed command and return the text to print
pub fn run(args: &Args) -> Result<String> {
    let config = load_config(args)?;

    match &args.command {
        Command::Sample(sample) => {
            let source = sample.input.source(&config)?;
            let signal = source.load()?;
            let demo = run_sampling_demo(&signal, &config.sampling, &sample.overrides())?;
            let artifacts =
                export_sampling_demo(&signal, &demo, &config, &sample.output, sample.plots)?;

            let report = SamplingReport::new(describe(&source), &signal, &demo, artifacts);
            render(args, &report, |r| format_sampling(r, args.verbose))
        }
        Command::Filter(filter) => {
            let source = filter.input.source(&config)?;
            let spec = filter.filter.spec()?;
            let signal = source.load()?;
            let demo = run_filter_demo(&signal, &spec, &config.filter)?;
            let artifacts = export_filter_demo(&demo, &config, &filter.output, filter.plots)?;

            let report = FilterReport::new(describe(&source), &demo, artifacts);
            render(args, &report, |r| format_filter(r, args.verbose))
        }
        Command::Response(response) => {
            let spec = response.filter.spec()?;
            let nyquist = response.sample_rate as f64 / 2.0;
            let coefficients = design_filter(&spec, nyquist)?;
            let curve = frequency_response(&coefficients, config.filter.response_points, nyquist)?;

            let report = ResponseReport::new(spec, response.sample_rate, &curve, &response.at);
            render(args, &report, format_response)
        }
    }
}

fn render<T: serde::Serialize>(args: &Args, report: &T, text: impl Fn(&T) -> String) -> Result<String> {
    if args.json {
        Ok(format_json(report)?)
    } else {
        Ok(text(report))
    }
}

fn describe(source: &InputSource) -> String {
    match source {
        InputSource::File(path) => path.display().to_string(),
        InputSource::Tone(tone) => format!(
            "{:.1} Hz tone, {:.2}s at {} Hz",
            tone.frequency_hz, tone.duration_secs, tone.sample_rate
        ),
    }
}
