//! Integration tests for barrido-config.
//!
//! These tests go through files on disk and into the analysis and model crates.

use barrido_config::{
    AliasingConfig, BranchConfig, ConfigError, DownsamplingConfig, FilterConfig, ModelConfig,
    PhaseConfig, SweepConfig,
};
use barrido_core::Signal;
use tempfile::TempDir;

#[test]
fn sweep_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("sweep.toml");

    let config = SweepConfig {
        sample_rate: 44100.0,
        duration_secs: Some(0.5),
        amplitude: 0.25,
        phase: PhaseConfig::Cosine,
        ..SweepConfig::default()
    };
    config.save(&path).unwrap();
    let loaded = SweepConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn sweep_from_file_generates_signal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sweep.toml");
    std::fs::write(
        &path,
        "sample_rate = 44100\napproximate_length = 44100\nfade_in_secs = 0\nfade_out_secs = 0\n",
    )
    .unwrap();

    let sweep = SweepConfig::load(&path).unwrap().build().unwrap();
    assert!((sweep.excitation_rate().unwrap() - 0.15).abs() < 1e-12);
    let signal = sweep.generate().unwrap();
    assert_eq!(signal.len(), sweep.actual_length().unwrap());
    assert_eq!(signal.len() % 2, 0);
}

#[test]
fn load_missing_file_reports_path() {
    let err = SweepConfig::load("/nonexistent/barrido/sweep.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("/nonexistent/barrido/sweep.toml"));
}

#[test]
fn model_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.toml");

    let config = ModelConfig::new("Saved")
        .with_aliasing(AliasingConfig::FullUpsampling)
        .with_downsampling(DownsamplingConfig::AfterLinear)
        .with_branch(BranchConfig::power(1))
        .with_branch(BranchConfig::power(3).with_filter(FilterConfig::Delay {
            samples: 2,
            length: 64,
        }))
        .with_branch(BranchConfig::power(2).with_filter(FilterConfig::File {
            path: "ir.wav".into(),
        }));
    config.save(&path).unwrap();
    assert_eq!(ModelConfig::load(&path).unwrap(), config);
}

#[test]
fn model_with_file_filter_resolves_relative_path() {
    let dir = TempDir::new().unwrap();
    let ir = Signal::mono(vec![0.0, 0.5, 0.0, 0.0], 48000.0, "ir").unwrap();
    barrido_io::write_wav(dir.path().join("ir.wav"), &ir, 32).unwrap();

    let model_path = dir.path().join("model.toml");
    std::fs::write(
        &model_path,
        r#"
name = "File filter"

[[branches]]
degree = 1
[branches.filter]
kind = "file"
path = "ir.wav"
"#,
    )
    .unwrap();

    let config = ModelConfig::load(&model_path).unwrap();
    let input = Signal::mono(vec![1.0, 2.0, 3.0, 4.0], 48000.0, "x").unwrap();
    let model = config.build(input, model_path.parent()).unwrap();

    // Half-gain one-sample delay, circular over the matched length
    let expected = [2.0, 0.5, 1.0, 1.5];
    let output = model.output().channel(0).unwrap();
    assert_eq!(output.len(), expected.len());
    for (a, e) in output.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{a} vs {e}");
    }
}

#[test]
fn identity_model_reproduces_input() {
    let input = Signal::mono(
        (0..256).map(|i| (i as f64 * 0.1).sin()).collect(),
        48000.0,
        "x",
    )
    .unwrap();
    let model = ModelConfig::default().build(input.clone(), None).unwrap();

    let output = model.output();
    assert_eq!(output.len(), barrido_models::DEFAULT_FILTER_LENGTH);
    for (a, b) in input.channel(0).unwrap().iter().zip(output.channel(0).unwrap()) {
        assert!((a - b).abs() < 1e-10);
    }
    assert!(output.channel(0).unwrap()[256..].iter().all(|x| x.abs() < 1e-10));
}
