//! Property-based tests for group models.

use std::sync::Arc;

use barrido_core::Signal;
use barrido_models::{
    DownsamplingPosition, HammersteinGroupModel, NoAliasingCompensation, NonlinearFunction, Power,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The group output is the zero-padded sum of its branch outputs, whatever the
    /// branch count and filter lengths.
    #[test]
    fn output_is_sum_of_branches(
        samples in prop::collection::vec(-1.0f64..1.0, 1..128),
        branches in prop::collection::vec((1u32..4, 1usize..64), 1..6),
        after_linear in any::<bool>(),
    ) {
        let input = Signal::mono(samples, 48000.0, "x").unwrap();
        let functions: Vec<Arc<dyn NonlinearFunction>> = branches
            .iter()
            .map(|&(d, _)| Arc::new(Power::new(d).unwrap()) as Arc<dyn NonlinearFunction>)
            .collect();
        let filters: Vec<Signal> = branches
            .iter()
            .map(|&(_, len)| Signal::impulse(48000.0, len).unwrap())
            .collect();
        let position = if after_linear {
            DownsamplingPosition::AfterLinearBlock
        } else {
            DownsamplingPosition::AfterNonlinearBlock
        };

        let model = HammersteinGroupModel::new(
            input.clone(),
            functions,
            filters,
            Box::new(NoAliasingCompensation::new()),
            position,
        )
        .unwrap();

        prop_assert_eq!(model.adder_count(), branches.len() - 1);
        let longest = model.branches().iter().map(|b| b.output().len()).max().unwrap();
        prop_assert_eq!(model.output().len(), longest);

        let out = model.output().channel(0).unwrap();
        for (i, &y) in out.iter().enumerate() {
            let expected: f64 = model
                .branches()
                .iter()
                .map(|b| b.output().channel(0).unwrap().get(i).copied().unwrap_or(0.0))
                .sum();
            prop_assert!((y - expected).abs() < 1e-9);
        }
    }
}
