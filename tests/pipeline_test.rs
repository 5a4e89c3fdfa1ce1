// tests/pipeline_test.rs
//
// End-to-end checks of the sampling and filtering demonstrations through the
// library API.

mod test_utils;

use nyquistlab::config::{FilterSettings, LabConfig};
use nyquistlab::core::decoder::decode_file;
use nyquistlab::core::pipeline::{export_filter_demo, export_sampling_demo};
use nyquistlab::core::{
    apply_filter, derive_scenarios, design_filter, estimate_dominant_frequency, run_filter_demo,
    run_sampling_demo, simulate_sampling, FilterSpec, SamplingRatios, ScenarioKind,
    ScenarioOverrides, Signal,
};
use nyquistlab::LabError;

use test_utils::{band_level_db, tone, two_tones, TempDir};

#[test]
fn test_reference_tone_scenarios() {
    let signal = tone(1000.0, 2.0);
    assert_eq!(signal.len(), 88200);

    let dominant = estimate_dominant_frequency(&signal).unwrap();
    assert!((dominant - 1000.0).abs() <= 1.0, "dominant {}", dominant);

    let scenarios =
        derive_scenarios(dominant, &SamplingRatios::default(), &ScenarioOverrides::default()).unwrap();
    let rates: Vec<u32> = scenarios.iter().map(|s| s.target_rate).collect();
    assert_eq!(rates, vec![666, 1000, 2500]);

    let demo =
        run_sampling_demo(&signal, &SamplingRatios::default(), &ScenarioOverrides::default()).unwrap();

    for outcome in &demo.outcomes {
        assert_eq!(outcome.sampled.reconstructed.len(), signal.len());
        assert_eq!(outcome.sampled.reconstructed.sample_rate(), 44100);
    }

    let under = &demo.outcomes[0];
    assert_eq!(under.scenario.kind, ScenarioKind::Undersampling);
    assert_eq!(under.sampled.stride, 66);
    assert!(
        under.reconstructed_frequency < 400.0,
        "undersampled tone should alias well below 1 kHz, got {}",
        under.reconstructed_frequency
    );

    let critical = &demo.outcomes[1];
    assert_eq!(critical.sampled.stride, 44);
    assert!(
        critical.reconstructed_frequency < 50.0,
        "critically sampled tone should collapse towards DC, got {}",
        critical.reconstructed_frequency
    );

    let over = &demo.outcomes[2];
    assert_eq!(over.sampled.stride, 17);
    assert!(
        (over.reconstructed_frequency - 1000.0).abs() <= 1.0,
        "oversampled tone should keep its frequency, got {}",
        over.reconstructed_frequency
    );
}

#[test]
fn test_overrides_replace_derived_rates() {
    let signal = tone(1000.0, 1.0);
    let overrides = ScenarioOverrides {
        undersampling: Some(400),
        critical: None,
        oversampling: Some(8000),
    };
    let demo = run_sampling_demo(&signal, &SamplingRatios::default(), &overrides).unwrap();

    let rates: Vec<u32> = demo.outcomes.iter().map(|o| o.scenario.target_rate).collect();
    assert_eq!(rates, vec![400, 1000, 8000]);
    assert_eq!(demo.outcomes[2].sampled.stride, 5);
}

#[test]
fn test_sampling_at_source_rate_is_identity() {
    let signal = tone(440.0, 1.0);
    let sampled = simulate_sampling(&signal, 44100).unwrap();
    assert_eq!(sampled.stride, 1);
    assert_eq!(sampled.reconstructed, signal);

    // Targets above the source rate cannot add samples
    let sampled = simulate_sampling(&signal, 96000).unwrap();
    assert_eq!(sampled.stride, 1);
    assert_eq!(sampled.reconstructed, signal);

    assert!(matches!(simulate_sampling(&signal, 0), Err(LabError::InvalidInput(_))));
}

#[test]
fn test_silence_has_no_dominant_frequency() {
    let silence = Signal::new(vec![0.0; 8000], 8000).unwrap();
    assert_eq!(estimate_dominant_frequency(&silence).unwrap(), 0.0);

    let demo =
        run_sampling_demo(&silence, &SamplingRatios::default(), &ScenarioOverrides::default()).unwrap();
    assert_eq!(demo.dominant_frequency, 0.0);
    assert!(demo.outcomes.iter().all(|o| o.scenario.target_rate == 1));
    assert!(demo
        .outcomes
        .iter()
        .all(|o| o.sampled.reconstructed.samples().iter().all(|&s| s == 0.0)));
}

#[test]
fn test_lowpass_attenuates_tone_above_cutoff() {
    let signal = tone(1000.0, 2.0);
    let demo = run_filter_demo(&signal, &FilterSpec::lowpass(500.0), &FilterSettings::default()).unwrap();

    assert_eq!(demo.filtered.len(), signal.len());
    assert!(
        demo.peak_reduction_db() >= 20.0,
        "peak reduced by only {:.1} dB",
        demo.peak_reduction_db()
    );
    assert_eq!(demo.response.frequencies.len(), 8000);
    assert!(demo.response.gain_at(100.0).unwrap().abs() < 0.1);
}

#[test]
fn test_filters_separate_two_tones() {
    let mixed = two_tones(200.0, 3000.0, 1.0);
    let nyquist = mixed.nyquist();

    let low_before = band_level_db(&mixed, 200.0, 5.0);
    let high_before = band_level_db(&mixed, 3000.0, 5.0);

    let lowpass = design_filter(&FilterSpec::lowpass(1000.0), nyquist).unwrap();
    let kept_low = apply_filter(&lowpass, &mixed).unwrap();
    assert!((band_level_db(&kept_low, 200.0, 5.0) - low_before).abs() < 1.0);
    assert!(high_before - band_level_db(&kept_low, 3000.0, 5.0) > 40.0);

    let highpass = design_filter(&FilterSpec::highpass(1000.0), nyquist).unwrap();
    let kept_high = apply_filter(&highpass, &mixed).unwrap();
    assert!((band_level_db(&kept_high, 3000.0, 5.0) - high_before).abs() < 1.0);
    assert!(low_before - band_level_db(&kept_high, 200.0, 5.0) > 40.0);
}

#[test]
fn test_bandpass_keeps_only_the_band() {
    let signal = tone(1000.0, 1.0);
    let demo = run_filter_demo(
        &signal,
        &FilterSpec::bandpass(300.0, 3000.0),
        &FilterSettings::default(),
    )
    .unwrap();
    assert!(demo.peak_reduction_db().abs() < 1.0);
    assert_eq!(demo.coefficients.a().len(), 13);

    let outside = tone(8000.0, 1.0);
    let demo = run_filter_demo(
        &outside,
        &FilterSpec::bandpass(300.0, 3000.0),
        &FilterSettings::default(),
    )
    .unwrap();
    assert!(demo.peak_reduction_db() > 20.0);
}

#[test]
fn test_design_rejects_bad_cutoffs() {
    let nyquist = 22050.0;
    for spec in [
        FilterSpec::lowpass(0.0),
        FilterSpec::lowpass(22050.0),
        FilterSpec::highpass(-100.0),
        FilterSpec::highpass(30000.0),
        FilterSpec::bandpass(2000.0, 1000.0),
        FilterSpec::bandpass(1000.0, 1000.0),
        FilterSpec::bandpass(100.0, 23000.0),
    ] {
        assert!(
            matches!(design_filter(&spec, nyquist), Err(LabError::InvalidInput(_))),
            "{} should be rejected",
            spec.kind
        );
    }
    assert!(design_filter(&FilterSpec::lowpass(100.0), 0.0).is_err());
}

#[test]
fn test_export_writes_playable_files() {
    let dir = TempDir::new("nyquistlab-export");
    let config = LabConfig::default();
    let signal = tone(1000.0, 1.0);

    let demo =
        run_sampling_demo(&signal, &config.sampling, &ScenarioOverrides::default()).unwrap();
    let artifacts = export_sampling_demo(&signal, &demo, &config, dir.path(), true).unwrap();

    assert_eq!(artifacts.audio.len(), 4);
    assert_eq!(artifacts.plots.len(), 2);
    for name in ["original.wav", "undersampling.wav", "critical.wav", "oversampling.wav"] {
        assert!(dir.join(name).exists(), "{} missing", name);
    }
    assert!(dir.join("sampling.png").exists());

    let decoded = decode_file(&dir.join("original.wav")).unwrap();
    assert_eq!(decoded.len(), signal.len());
    assert_eq!(decoded.sample_rate(), 44100);
    let max_err = decoded
        .samples()
        .iter()
        .zip(signal.samples())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);
    assert!(max_err < 1e-3, "max error {}", max_err);

    let filtered = run_filter_demo(&signal, &FilterSpec::lowpass(500.0), &config.filter).unwrap();
    let artifacts = export_filter_demo(&filtered, &config, dir.path(), false).unwrap();
    assert_eq!(artifacts.audio, vec![dir.join("filtered.wav")]);
    assert!(artifacts.plots.is_empty());
    assert!(!dir.join("response.png").exists());
}
