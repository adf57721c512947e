//! Parallel Hammerstein (branch-sum) models.
//!
//! ```text
//!          ┌─ NL₀ → h₀ ─┐
//! input ───┼─ NL₁ → h₁ ─┼── Σ ── output
//!          └─ NL₂ → h₂ ─┘
//! ```
//!
//! Every branch receives the same input and owns a private aliasing compensation
//! spawned from the model's prototype. Branch outputs are combined by a
//! right-folded chain of adders (see [`SumNode::right_fold`]).

use std::sync::Arc;

use barrido_core::{Error, Result, Signal};

use crate::aliasing::{AliasingCompensation, NoAliasingCompensation};
use crate::branch::{DownsamplingPosition, HammersteinBranch};
use crate::nonlinear::{NonlinearFunction, Power};
use crate::summation::SumNode;

/// Length of the unit-impulse filters used when none are given.
pub const DEFAULT_FILTER_LENGTH: usize = 1 << 10;

/// Optional replacements for the parameters of a [`HammersteinGroupModel`].
///
/// Unset fields fall back to the defaults in
/// [`HammersteinGroupModel::from_overrides`] or to the source model's values in
/// [`HammersteinGroupModel::create_modified`].
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    /// Input signal.
    pub input: Option<Signal>,
    /// Nonlinearities, one per branch.
    pub nonlinear_functions: Option<Vec<Arc<dyn NonlinearFunction>>>,
    /// Filter impulse responses, one per branch.
    pub filter_impulse_responses: Option<Vec<Signal>>,
    /// Aliasing compensation strategy; each branch gets a fresh instance.
    pub aliasing_compensation: Option<Box<dyn AliasingCompensation>>,
    /// Downsampling position for every branch.
    pub downsampling_position: Option<DownsamplingPosition>,
}

impl ModelOverrides {
    /// Override the input.
    pub fn input(mut self, input: Signal) -> Self {
        self.input = Some(input);
        self
    }

    /// Override the nonlinearities.
    pub fn nonlinear_functions(mut self, functions: Vec<Arc<dyn NonlinearFunction>>) -> Self {
        self.nonlinear_functions = Some(functions);
        self
    }

    /// Override the filter impulse responses.
    pub fn filter_impulse_responses(mut self, filters: Vec<Signal>) -> Self {
        self.filter_impulse_responses = Some(filters);
        self
    }

    /// Override the aliasing compensation strategy.
    pub fn aliasing_compensation(mut self, aliasing: Box<dyn AliasingCompensation>) -> Self {
        self.aliasing_compensation = Some(aliasing);
        self
    }

    /// Override the downsampling position.
    pub fn downsampling_position(mut self, position: DownsamplingPosition) -> Self {
        self.downsampling_position = Some(position);
        self
    }
}

/// Sum of Hammerstein branches sharing one input.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use barrido_core::Signal;
/// use barrido_models::{
///     DownsamplingPosition, HammersteinGroupModel, NoAliasingCompensation, NonlinearFunction, Power,
/// };
///
/// let input = Signal::mono(vec![0.5, -0.5, 0.25], 48000.0, "x").unwrap();
/// let functions: Vec<Arc<dyn NonlinearFunction>> =
///     vec![Arc::new(Power::new(1).unwrap()), Arc::new(Power::new(2).unwrap())];
/// let filters = vec![Signal::impulse(48000.0, 3).unwrap(); 2];
///
/// let model = HammersteinGroupModel::new(
///     input,
///     functions,
///     filters,
///     Box::new(NoAliasingCompensation::new()),
///     DownsamplingPosition::AfterNonlinearBlock,
/// )
/// .unwrap();
///
/// // x + x²
/// let y = model.output().channel(0).unwrap();
/// assert!((y[0] - 0.75).abs() < 1e-12);
/// assert!((y[1] + 0.25).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct HammersteinGroupModel {
    input: Signal,
    nonlinear_functions: Vec<Arc<dyn NonlinearFunction>>,
    filter_impulse_responses: Vec<Signal>,
    aliasing: Box<dyn AliasingCompensation>,
    position: DownsamplingPosition,
    branches: Vec<HammersteinBranch>,
    summation: SumNode,
    sum: Signal,
}

impl HammersteinGroupModel {
    /// Build a model with one branch per (nonlinearity, filter) pair and evaluate
    /// it for `input`.
    ///
    /// Fails with [`Error::Configuration`] when the two lists differ in length or
    /// are empty.
    pub fn new(
        input: Signal,
        nonlinear_functions: Vec<Arc<dyn NonlinearFunction>>,
        filter_impulse_responses: Vec<Signal>,
        aliasing: Box<dyn AliasingCompensation>,
        position: DownsamplingPosition,
    ) -> Result<Self> {
        if nonlinear_functions.len() != filter_impulse_responses.len() {
            return Err(Error::configuration(format!(
                "{} nonlinear functions but {} filter impulse responses",
                nonlinear_functions.len(),
                filter_impulse_responses.len()
            )));
        }
        let summation = SumNode::right_fold(nonlinear_functions.len())
            .ok_or_else(|| Error::configuration("a group model needs at least one branch"))?;

        let branches = nonlinear_functions
            .iter()
            .zip(&filter_impulse_responses)
            .map(|(nonlinear, filter)| {
                HammersteinBranch::new(
                    input.clone(),
                    Arc::clone(nonlinear),
                    filter.clone(),
                    aliasing.spawn(),
                    position,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let sum = match summation {
            SumNode::Branch(_) => Signal::default(),
            SumNode::Adder { .. } => {
                let outputs: Vec<&Signal> = branches.iter().map(HammersteinBranch::output).collect();
                summation.evaluate(&outputs)?
            }
        };

        tracing::debug!(
            branches = branches.len(),
            adders = summation.adder_count(),
            ?position,
            aliasing = ?aliasing,
            "built Hammerstein group model"
        );

        Ok(Self {
            input,
            nonlinear_functions,
            filter_impulse_responses,
            aliasing,
            position,
            branches,
            summation,
            sum,
        })
    }

    /// Build a model from overrides, with defaults for unset fields.
    ///
    /// Defaults: an empty input at the default rate, a single [`Power`] of degree 1,
    /// unit impulses of [`DEFAULT_FILTER_LENGTH`] samples at the input rate (one
    /// per nonlinearity), [`NoAliasingCompensation`] and
    /// [`DownsamplingPosition::AfterNonlinearBlock`].
    pub fn from_overrides(overrides: ModelOverrides) -> Result<Self> {
        let input = overrides.input.unwrap_or_default();
        let nonlinear_functions = match overrides.nonlinear_functions {
            Some(functions) => functions,
            None => vec![Arc::new(Power::new(1)?) as Arc<dyn NonlinearFunction>],
        };
        let filter_impulse_responses = match overrides.filter_impulse_responses {
            Some(filters) => filters,
            None => vec![
                Signal::impulse(input.sampling_rate(), DEFAULT_FILTER_LENGTH)?;
                nonlinear_functions.len()
            ],
        };
        let aliasing = overrides
            .aliasing_compensation
            .unwrap_or_else(|| Box::new(NoAliasingCompensation::new()));
        let position = overrides.downsampling_position.unwrap_or_default();

        Self::new(input, nonlinear_functions, filter_impulse_responses, aliasing, position)
    }

    /// A new model with the given overrides and every other parameter copied from
    /// this one. `self` is left untouched.
    pub fn create_modified(&self, overrides: ModelOverrides) -> Result<Self> {
        Self::new(
            overrides.input.unwrap_or_else(|| self.input.clone()),
            overrides
                .nonlinear_functions
                .unwrap_or_else(|| self.nonlinear_functions.clone()),
            overrides
                .filter_impulse_responses
                .unwrap_or_else(|| self.filter_impulse_responses.clone()),
            overrides
                .aliasing_compensation
                .unwrap_or_else(|| self.aliasing.spawn()),
            overrides.downsampling_position.unwrap_or(self.position),
        )
    }

    /// Feed `input` to every branch and recompute the sum.
    ///
    /// Either every branch takes the new input or, on error, none does.
    pub fn set_input(&mut self, input: Signal) -> Result<()> {
        let outputs = self
            .branches
            .iter_mut()
            .map(|branch| branch.evaluate(&input))
            .collect::<Result<Vec<_>>>()?;

        let sum = match self.summation {
            SumNode::Branch(_) => Signal::default(),
            SumNode::Adder { .. } => self.summation.evaluate(&outputs.iter().collect::<Vec<_>>())?,
        };

        for (branch, output) in self.branches.iter_mut().zip(outputs) {
            branch.commit(input.clone(), output);
        }
        tracing::debug!(branches = self.branches.len(), len = input.len(), "fanned out new input");
        self.input = input;
        self.sum = sum;
        Ok(())
    }

    /// Model output for the current input.
    pub fn output(&self) -> &Signal {
        match self.summation {
            SumNode::Branch(i) => self.branches[i].output(),
            SumNode::Adder { .. } => &self.sum,
        }
    }

    /// Current input.
    pub fn input(&self) -> &Signal {
        &self.input
    }

    /// Nonlinearities, in branch order.
    pub fn nonlinear_functions(&self) -> &[Arc<dyn NonlinearFunction>] {
        &self.nonlinear_functions
    }

    /// Filter impulse responses, in branch order.
    pub fn filter_impulse_responses(&self) -> &[Signal] {
        &self.filter_impulse_responses
    }

    /// Prototype aliasing compensation the branches were spawned from.
    pub fn aliasing_compensation(&self) -> &dyn AliasingCompensation {
        self.aliasing.as_ref()
    }

    /// Downsampling position shared by all branches.
    pub fn downsampling_position(&self) -> DownsamplingPosition {
        self.position
    }

    /// Branches, in order.
    pub fn branches(&self) -> &[HammersteinBranch] {
        &self.branches
    }

    /// Number of branches.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Number of adders in the summation tree.
    pub fn adder_count(&self) -> usize {
        self.summation.adder_count()
    }

    /// Summation tree over the branch outputs.
    pub fn summation(&self) -> &SumNode {
        &self.summation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn functions(degrees: &[u32]) -> Vec<Arc<dyn NonlinearFunction>> {
        degrees
            .iter()
            .map(|&d| Arc::new(Power::new(d).unwrap()) as Arc<dyn NonlinearFunction>)
            .collect()
    }

    #[test]
    fn count_mismatch_is_configuration_error() {
        let err = HammersteinGroupModel::new(
            Signal::default(),
            functions(&[1, 2]),
            vec![Signal::impulse(48000.0, 8).unwrap(); 3],
            Box::new(NoAliasingCompensation::new()),
            DownsamplingPosition::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Configuration("2 nonlinear functions but 3 filter impulse responses".into())
        );
    }

    #[test]
    fn empty_model_is_rejected() {
        let overrides = ModelOverrides::default()
            .nonlinear_functions(Vec::new())
            .filter_impulse_responses(Vec::new());
        assert!(matches!(
            HammersteinGroupModel::from_overrides(overrides),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn defaults() {
        let model = HammersteinGroupModel::from_overrides(ModelOverrides::default()).unwrap();
        assert_eq!(model.branch_count(), 1);
        assert_eq!(model.adder_count(), 0);
        assert_eq!(model.filter_impulse_responses()[0].len(), DEFAULT_FILTER_LENGTH);
        assert_eq!(model.nonlinear_functions()[0].maximum_harmonics(), 1);
        assert_eq!(model.downsampling_position(), DownsamplingPosition::AfterNonlinearBlock);
        // Empty input through a 1024-tap filter: zero padded to the filter length
        assert_eq!(model.output().len(), DEFAULT_FILTER_LENGTH);
        assert_eq!(model.output().peak(), 0.0);
    }

    #[test]
    fn default_filters_follow_input_rate() {
        let input = Signal::mono(vec![1.0; 4], 44100.0, "x").unwrap();
        let model = HammersteinGroupModel::from_overrides(
            ModelOverrides::default()
                .input(input)
                .nonlinear_functions(functions(&[1, 2, 3])),
        )
        .unwrap();
        assert_eq!(model.branch_count(), 3);
        assert_eq!(model.adder_count(), 2);
        assert!(
            model
                .filter_impulse_responses()
                .iter()
                .all(|f| f.sampling_rate() == 44100.0)
        );
    }

    #[test]
    fn set_input_is_all_or_nothing() {
        let stereo = Signal::new(vec![vec![1.0, 0.0]; 2], 48000.0, Vec::new()).unwrap();
        let mono = Signal::impulse(48000.0, 2).unwrap();
        let mut model = HammersteinGroupModel::new(
            Signal::mono(vec![0.5; 4], 48000.0, "").unwrap(),
            functions(&[1, 2]),
            vec![mono, stereo],
            Box::new(NoAliasingCompensation::new()),
            DownsamplingPosition::default(),
        )
        .unwrap();
        let before = model.output().clone();

        // The first branch accepts three channels, the second does not
        let bad = Signal::new(vec![vec![1.0; 4]; 3], 48000.0, Vec::new()).unwrap();
        assert!(model.set_input(bad).is_err());
        assert_eq!(model.output(), &before);
        assert_eq!(model.branches()[0].input().channel_count(), 1);
    }
}
