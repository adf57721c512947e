//! Integration tests for barrido-models.
//!
//! Build branches and group models through the public API and compare them
//! against each other and against closed-form expectations.

use std::sync::Arc;

use barrido_analysis::sweep::{NovakSweep, SweepParameters};
use barrido_core::{Error, Signal};
use barrido_models::{
    AliasingCompensation, DownsamplingPosition, FullUpsamplingAliasingCompensation,
    HammersteinBranch, HammersteinGroupModel, ModelOverrides, NoAliasingCompensation,
    NonlinearFunction, Power,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const RATE: f64 = 48000.0;

fn power(degree: u32) -> Arc<dyn NonlinearFunction> {
    Arc::new(Power::new(degree).unwrap())
}

fn tone(frequency: f64, len: usize, amplitude: f64) -> Signal {
    Signal::mono(
        (0..len)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * frequency * i as f64 / RATE).sin())
            .collect(),
        RATE,
        "tone",
    )
    .unwrap()
}

/// Short decaying filter.
fn lowpass(len: usize) -> Signal {
    let taps: Vec<f64> = (0..len).map(|i| 0.5f64.powi(i as i32)).collect();
    let sum: f64 = taps.iter().sum();
    Signal::mono(taps.iter().map(|t| t / sum).collect(), RATE, "lowpass").unwrap()
}

fn model(
    degrees: &[u32],
    filters: Vec<Signal>,
    aliasing: Box<dyn AliasingCompensation>,
    position: DownsamplingPosition,
) -> HammersteinGroupModel {
    HammersteinGroupModel::new(
        tone(440.0, 2048, 0.5),
        degrees.iter().map(|&d| power(d)).collect(),
        filters,
        aliasing,
        position,
    )
    .unwrap()
}

// ===========================================================================
// 1. Single branch equivalence
// ===========================================================================

#[test]
fn single_branch_group_is_bit_identical_to_branch() {
    for position in [
        DownsamplingPosition::AfterNonlinearBlock,
        DownsamplingPosition::AfterLinearBlock,
    ] {
        let group = model(
            &[3],
            vec![lowpass(64)],
            Box::new(FullUpsamplingAliasingCompensation::new()),
            position,
        );
        let branch = HammersteinBranch::new(
            tone(440.0, 2048, 0.5),
            power(3),
            lowpass(64),
            Box::new(FullUpsamplingAliasingCompensation::new()),
            position,
        )
        .unwrap();

        assert_eq!(group.adder_count(), 0);
        assert_eq!(group.output(), branch.output());
    }
}

#[test]
fn identity_model_reproduces_input() {
    let model = HammersteinGroupModel::from_overrides(
        ModelOverrides::default().input(tone(1000.0, 4096, 0.8)),
    )
    .unwrap();
    let expected = tone(1000.0, 4096, 0.8);
    for (a, b) in model
        .output()
        .channel(0)
        .unwrap()
        .iter()
        .zip(expected.channel(0).unwrap())
    {
        assert!((a - b).abs() < 1e-12);
    }
}

// ===========================================================================
// 2. Construction
// ===========================================================================

#[test]
fn two_functions_three_filters_fails() {
    let result = HammersteinGroupModel::new(
        tone(440.0, 128, 0.5),
        vec![power(1), power(2)],
        vec![lowpass(8), lowpass(8), lowpass(8)],
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn summation_tree_has_one_adder_less_than_branches() {
    let m = model(
        &[1, 2, 3, 4, 5],
        vec![lowpass(16); 5],
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    assert_eq!(m.branch_count(), 5);
    assert_eq!(m.adder_count(), 4);
}

#[test]
fn group_output_is_sum_of_branch_outputs() {
    let m = model(
        &[1, 2, 3],
        vec![lowpass(16), lowpass(32), Signal::impulse(RATE, 8).unwrap()],
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    let out = m.output().channel(0).unwrap();
    for i in 0..out.len() {
        let expected: f64 = m
            .branches()
            .iter()
            .map(|b| b.output().channel(0).unwrap().get(i).copied().unwrap_or(0.0))
            .sum();
        assert!((out[i] - expected).abs() < 1e-12);
    }
}

// ===========================================================================
// 3. Copy with override
// ===========================================================================

#[test]
fn create_modified_without_overrides_matches() {
    let original = model(
        &[1, 2],
        vec![lowpass(32), lowpass(16)],
        Box::new(FullUpsamplingAliasingCompensation::new()),
        DownsamplingPosition::AfterLinearBlock,
    );
    let copy = original.create_modified(ModelOverrides::default()).unwrap();

    assert_eq!(copy.output(), original.output());
    assert_eq!(copy.input(), original.input());
    assert_eq!(copy.downsampling_position(), original.downsampling_position());
    assert!(Arc::ptr_eq(
        &copy.nonlinear_functions()[0],
        &original.nonlinear_functions()[0]
    ));
}

#[test]
fn create_modified_overrides_only_given_fields() {
    let original = model(
        &[1, 2],
        vec![lowpass(32), lowpass(16)],
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    let modified = original
        .create_modified(
            ModelOverrides::default().downsampling_position(DownsamplingPosition::AfterLinearBlock),
        )
        .unwrap();

    assert_eq!(modified.downsampling_position(), DownsamplingPosition::AfterLinearBlock);
    assert_eq!(modified.filter_impulse_responses(), original.filter_impulse_responses());
    assert_eq!(original.downsampling_position(), DownsamplingPosition::AfterNonlinearBlock);
}

// ===========================================================================
// 4. Downsampling positions and aliasing compensation
// ===========================================================================

#[test]
fn positions_agree_without_aliasing_compensation() {
    let filters = vec![lowpass(64), lowpass(8), lowpass(128)];
    let a = model(
        &[1, 2, 3],
        filters.clone(),
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    let b = model(
        &[1, 2, 3],
        filters,
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterLinearBlock,
    );
    assert_eq!(a.output(), b.output());
}

#[test]
fn upsampling_returns_to_input_rate() {
    for position in [
        DownsamplingPosition::AfterNonlinearBlock,
        DownsamplingPosition::AfterLinearBlock,
    ] {
        let m = model(
            &[1, 2, 3],
            vec![lowpass(64); 3],
            Box::new(FullUpsamplingAliasingCompensation::new()),
            position,
        );
        assert_eq!(m.output().sampling_rate(), RATE);
        assert_eq!(m.output().len(), 2048);
        for branch in m.branches() {
            assert_eq!(branch.output().sampling_rate(), RATE);
        }
    }
}

#[test]
fn positions_agree_for_in_band_harmonics() {
    // 500 Hz cubed stays far below Nyquist, so both placements filter the same content.
    let make = |position| {
        HammersteinGroupModel::new(
            tone(500.0, 4800, 0.5),
            vec![power(3)],
            vec![Signal::impulse(RATE, 256).unwrap()],
            Box::new(FullUpsamplingAliasingCompensation::new()),
            position,
        )
        .unwrap()
    };
    let a = make(DownsamplingPosition::AfterNonlinearBlock);
    let b = make(DownsamplingPosition::AfterLinearBlock);
    let expected = tone(500.0, 4800, 0.5).map(|x| x.powi(3));

    for i in 200..4600 {
        let e = expected.channel(0).unwrap()[i];
        assert!((a.output().channel(0).unwrap()[i] - e).abs() < 1e-2);
        assert!((b.output().channel(0).unwrap()[i] - e).abs() < 1e-2);
    }
}

#[test]
fn upsampling_suppresses_aliasing() {
    // 9 kHz cubed at 48 kHz: the 27 kHz harmonic aliases to 21 kHz without compensation.
    let input = tone(9000.0, 4800, 0.5);
    let run = |aliasing: Box<dyn AliasingCompensation>| {
        HammersteinGroupModel::new(
            input.clone(),
            vec![power(3)],
            vec![Signal::impulse(RATE, 64).unwrap()],
            aliasing,
            DownsamplingPosition::AfterNonlinearBlock,
        )
        .unwrap()
        .output()
        .clone()
    };
    let level_at = |signal: &Signal, frequency: f64| {
        let samples = &signal.channel(0).unwrap()[400..4400];
        let (mut re, mut im) = (0.0, 0.0);
        for (i, &x) in samples.iter().enumerate() {
            let w = 2.0 * std::f64::consts::PI * frequency * i as f64 / RATE;
            re += x * w.cos();
            im += x * w.sin();
        }
        (re * re + im * im).sqrt() / samples.len() as f64
    };

    let aliased = run(Box::new(NoAliasingCompensation::new()));
    let compensated = run(Box::new(FullUpsamplingAliasingCompensation::new()));
    assert!(level_at(&aliased, 21000.0) > 0.01);
    assert!(level_at(&compensated, 21000.0) < 0.1 * level_at(&aliased, 21000.0));
    // The fundamental is untouched
    let fundamental = level_at(&aliased, 9000.0);
    assert!((level_at(&compensated, 9000.0) - fundamental).abs() < 0.05 * fundamental);
}

// ===========================================================================
// 5. Input fan-out
// ===========================================================================

#[test]
fn set_input_updates_every_branch() {
    let mut m = model(
        &[1, 2],
        vec![lowpass(16); 2],
        Box::new(NoAliasingCompensation::new()),
        DownsamplingPosition::AfterNonlinearBlock,
    );
    let sweep = NovakSweep::sine(SweepParameters::new(RATE, 100.0, 10000.0, 4800))
        .unwrap()
        .generate()
        .unwrap();
    m.set_input(sweep.clone()).unwrap();

    assert_eq!(m.input(), &sweep);
    for branch in m.branches() {
        assert_eq!(branch.input(), &sweep);
    }
    let fresh = m.create_modified(ModelOverrides::default()).unwrap();
    assert_eq!(fresh.output(), m.output());
}
