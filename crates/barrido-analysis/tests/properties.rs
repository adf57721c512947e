//! Property-based tests for sweep generation.

use barrido_analysis::sweep::{NovakSweep, SweepParameters, SweepPhase};
use proptest::prelude::*;

fn any_phase() -> impl Strategy<Value = SweepPhase> {
    prop_oneof![Just(SweepPhase::Sine), Just(SweepPhase::Cosine)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every generated sweep has an even number of samples.
    #[test]
    fn generated_length_is_even(
        rate in 8000.0f64..48000.0,
        start in 10.0f64..200.0,
        span in 2.0f64..100.0,
        length in 1000usize..20000,
        fade_in in 0usize..500,
        fade_out in 0usize..500,
        phase in any_phase(),
    ) {
        let params = SweepParameters::new(rate, start, start * span, length)
            .with_fades(fade_in, fade_out);
        let sweep = NovakSweep::new(params, phase);
        prop_assume!(sweep.is_ok());
        let sweep = sweep.unwrap();

        let signal = sweep.generate().unwrap();
        prop_assert_eq!(signal.len() % 2, 0);
        let actual = sweep.actual_length().unwrap();
        prop_assert_eq!(signal.len(), actual - actual % 2);
        prop_assert!(signal.is_finite());
    }

    /// Scaling the amplitude scales every sample by the same factor.
    #[test]
    fn amplitude_is_linear(
        amplitude in 0.1f64..2.0,
        k in 0.1f64..10.0,
        phase in any_phase(),
    ) {
        let params = SweepParameters::new(8000.0, 40.0, 3000.0, 4000).with_fades(80, 80);
        let base = NovakSweep::new(params.clone().with_amplitude(amplitude), phase)
            .unwrap()
            .generate()
            .unwrap();
        let scaled = NovakSweep::new(params.with_amplitude(k * amplitude), phase)
            .unwrap()
            .generate()
            .unwrap();

        prop_assert_eq!(base.len(), scaled.len());
        for (a, b) in base.channel(0).unwrap().iter().zip(scaled.channel(0).unwrap()) {
            prop_assert!((k * a - b).abs() < 1e-12 * k * amplitude.max(1.0) * 10.0);
        }
    }

    /// The excitation rate always spans a whole number of start-frequency periods.
    #[test]
    fn excitation_rate_is_synchronized(
        start in 10.0f64..200.0,
        span in 2.0f64..100.0,
        length in 1000usize..100_000,
    ) {
        let sweep = NovakSweep::sine(SweepParameters::new(44100.0, start, start * span, length));
        prop_assume!(sweep.is_ok());
        let periods = sweep.unwrap().excitation_rate().unwrap() * start;
        prop_assert!((periods - periods.round()).abs() < 1e-9);
        prop_assert!(periods >= 1.0);
    }
}
