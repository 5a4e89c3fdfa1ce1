// src/core/visualization/plot.rs
//
// Line plots for the sampling and filtering demonstrations

use image::RgbImage;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::{
    BitMapBackend, Cartesian2d, ChartBuilder, ChartContext, Circle, Color, DrawingArea,
    EmptyElement, IntoDrawingArea, LineSeries, PathElement, PointSeries, RGBColor,
    SeriesLabelPosition, BLACK, WHITE,
};
use plotters::style::{register_font, FontStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::core::dsp::response::FrequencyResponse;
use crate::core::dsp::Spectrum;
use crate::core::sampling::{SampledSignal, SamplingScenario};
use crate::core::signal::Signal;
use crate::error::{LabError, Result};

const FONT_FAMILY: &str = "sans-serif";
const FONT_DATA: &[u8] = include_bytes!("../../../fonts/DejaVuSans.ttf");

/// Plot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    /// Height of each stacked panel
    pub panel_height: u32,
    /// Only the first `time_window_secs` of a waveform are drawn
    pub time_window_secs: Option<f64>,
    pub min_db: f64,
    pub max_db: f64,
    pub background: [u8; 3],
    pub axis: [u8; 3],
    pub original: [u8; 3],
    pub processed: [u8; 3],
    pub markers: [u8; 3],
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            panel_height: 300,
            time_window_secs: Some(0.02),
            min_db: -120.0,
            max_db: 100.0,
            background: [255, 255, 255],
            axis: [160, 160, 160],
            original: [148, 0, 211],
            processed: [0, 114, 189],
            markers: [217, 83, 25],
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < 200 || self.panel_height < 120 {
            return Err(LabError::invalid(
                "plot must be at least 200 px wide with 120 px panels",
            ));
        }
        if let Some(window) = self.time_window_secs {
            if !(window > 0.0) {
                return Err(LabError::invalid("plot time window must be positive"));
            }
        }
        if !(self.min_db < self.max_db) {
            return Err(LabError::invalid("plot dB range is empty"));
        }
        Ok(())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn plot_error<E: std::fmt::Display>(err: E) -> LabError {
    LabError::Plot(err.to_string())
}

fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Make the bundled DejaVu Sans available to plotters, once per process
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok());
    if ok {
        Ok(())
    } else {
        Err(LabError::Plot("embedded font could not be loaded".to_string()))
    }
}

/// Draw `panels` stacked panels into an RGB buffer and save it as an image
fn render<F>(config: &PlotConfig, panels: u32, output_path: &Path, draw: F) -> Result<()>
where
    F: FnOnce(&Area<'_>) -> Result<()>,
{
    config.validate()?;
    ensure_font()?;

    let (width, height) = (config.width, config.panel_height * panels);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&rgb(config.background)).map_err(plot_error)?;
        draw(&root)?;
        root.present().map_err(plot_error)?;
    }

    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| LabError::Plot("bitmap does not match the image size".to_string()))?;
    img.save(output_path)?;
    Ok(())
}

/// Titled chart with labelled axes and a light grid
fn build_chart<'a, 'b>(
    area: &'a Area<'b>,
    title: &str,
    x_range: (f64, f64),
    y_range: (f64, f64),
    labels: (&str, &str),
    config: &PlotConfig,
) -> Result<Chart<'a, 'b>> {
    let (x_range, y_range) = (widen(x_range), widen(y_range));
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT_FAMILY, 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(labels.0)
        .y_desc(labels.1)
        .axis_desc_style((FONT_FAMILY, 14))
        .label_style((FONT_FAMILY, 12))
        .axis_style(rgb(config.axis))
        .light_line_style(rgb(config.axis).mix(0.15))
        .bold_line_style(rgb(config.axis).mix(0.3))
        .draw()
        .map_err(plot_error)?;

    Ok(chart)
}

fn legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>) -> Result<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT_FAMILY, 12))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)
}

fn widen(range: (f64, f64)) -> (f64, f64) {
    if range.1 > range.0 {
        range
    } else {
        (range.0 - 1.0, range.0 + 1.0)
    }
}

fn amplitude_range(signals: &[&Signal]) -> (f64, f64) {
    let peak = signals
        .iter()
        .map(|s| s.peak())
        .fold(0.0f64, f64::max)
        .max(1e-6);
    (-peak * 1.1, peak * 1.1)
}

fn time_range(signal: &Signal, config: &PlotConfig) -> (f64, f64) {
    let end = config
        .time_window_secs
        .map(|w| w.min(signal.duration_secs()))
        .unwrap_or(signal.duration_secs());
    (0.0, end)
}

/// `(x, y)` pairs with `x` inside `range`
fn points_within(xs: &[f64], ys: &[f64], range: (f64, f64)) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter(|(x, _)| **x >= range.0 && **x <= range.1)
        .map(|(&x, &y)| (x, y))
        .collect()
}

/// dB curve clamped into the plotted range
fn db_points(xs: &[f64], ys: &[f64], range: (f64, f64)) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y.clamp(range.0, range.1)))
        .collect()
}

/// Waveform of a single signal
pub fn render_waveform(signal: &Signal, config: &PlotConfig, output_path: &Path) -> Result<()> {
    render(config, 1, output_path, |root| {
        let x_range = time_range(signal, config);
        let mut chart = build_chart(
            root,
            "Original Signal",
            x_range,
            amplitude_range(&[signal]),
            ("Time (s)", "Amplitude"),
            config,
        )?;

        let color = rgb(config.original);
        chart
            .draw_series(LineSeries::new(
                points_within(&signal.times(), signal.samples(), x_range),
                &color,
            ))
            .map_err(plot_error)?;
        Ok(())
    })
}

/// One panel per scenario: original (faint), reconstruction and sampled points
pub fn render_sampling_demo(
    original: &Signal,
    outcomes: &[(SamplingScenario, &SampledSignal)],
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    if outcomes.is_empty() {
        return Err(LabError::invalid("nothing to plot"));
    }

    render(config, outcomes.len() as u32, output_path, |root| {
        let times = original.times();
        let x_range = time_range(original, config);
        let faint = rgb(config.original).mix(0.35);
        let processed = rgb(config.processed);
        let markers = rgb(config.markers);

        let panels = root.split_evenly((outcomes.len(), 1));
        for (panel, (scenario, sampled)) in panels.iter().zip(outcomes) {
            let title = format!(
                "{} - {} Hz (effective {:.1} Hz)",
                scenario.kind.title(),
                scenario.target_rate,
                sampled.effective_rate()
            );
            let mut chart = build_chart(
                panel,
                &title,
                x_range,
                amplitude_range(&[original, &sampled.reconstructed]),
                ("Time (s)", "Amplitude"),
                config,
            )?;

            chart
                .draw_series(LineSeries::new(
                    points_within(&times, original.samples(), x_range),
                    faint,
                ))
                .map_err(plot_error)?
                .label("Original")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], faint));

            chart
                .draw_series(LineSeries::new(
                    points_within(&times, sampled.reconstructed.samples(), x_range),
                    processed.stroke_width(2),
                ))
                .map_err(plot_error)?
                .label("Reconstructed")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], processed));

            chart
                .draw_series(PointSeries::of_element(
                    points_within(&sampled.sample_times(), &sampled.sampled_values, x_range),
                    3,
                    markers.filled(),
                    &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
                ))
                .map_err(plot_error)?
                .label("Samples")
                .legend(move |(x, y)| Circle::new((x + 10, y), 3, markers.filled()));

            legend(&mut chart)?;
        }
        Ok(())
    })
}

/// Original and filtered magnitude spectra in dB, overlaid
pub fn render_spectra(
    original: &Spectrum,
    filtered: &Spectrum,
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    render(config, 1, output_path, |root| {
        let max_freq = original
            .frequencies
            .last()
            .copied()
            .unwrap_or(0.0)
            .max(filtered.frequencies.last().copied().unwrap_or(0.0));
        let db_range = (config.min_db, config.max_db);

        let mut chart = build_chart(
            root,
            "Magnitude Spectrum",
            (0.0, max_freq),
            db_range,
            ("Frequency (Hz)", "Magnitude (dB)"),
            config,
        )?;

        let (before, after) = (rgb(config.original), rgb(config.processed));
        chart
            .draw_series(LineSeries::new(
                db_points(&original.frequencies, &original.magnitudes_db(), db_range),
                &before,
            ))
            .map_err(plot_error)?
            .label("Original")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], before));
        chart
            .draw_series(LineSeries::new(
                db_points(&filtered.frequencies, &filtered.magnitudes_db(), db_range),
                &after,
            ))
            .map_err(plot_error)?
            .label("Filtered")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], after));

        legend(&mut chart)
    })
}

/// Filter gain in dB against frequency
pub fn render_response(
    response: &FrequencyResponse,
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    render(config, 1, output_path, |root| {
        let max_freq = response.frequencies.last().copied().unwrap_or(0.0);
        // Down to min_db and a little above unity
        let db_range = (config.min_db, 10.0);

        let mut chart = build_chart(
            root,
            "Filter Frequency Response",
            (0.0, max_freq),
            db_range,
            ("Frequency (Hz)", "Gain (dB)"),
            config,
        )?;

        let color = rgb(config.processed);
        chart
            .draw_series(LineSeries::new(
                db_points(&response.frequencies, &response.gain_db, db_range),
                color.stroke_width(2),
            ))
            .map_err(plot_error)?;
        Ok(())
    })
}
