//! A single Hammerstein branch: nonlinearity, then linear filter.
//!
//! ```text
//! AfterNonlinearBlock:
//!   input → preprocess → nonlinearity → postprocess → (∗ filter) → output
//!
//! AfterLinearBlock:
//!   input → preprocess → nonlinearity → × attenuation → (∗ filter) → postprocess → output
//! ```
//!
//! `∗ filter` is a circular FFT convolution after resampling the impulse response
//! to the signal's rate and zero-padding both to a common length. Deferring the
//! downsampling until after the filter keeps the filter's own band limit in effect
//! at the raised rate.

use std::sync::Arc;

use barrido_analysis::convolve::circular_convolve;
use barrido_analysis::resample::resample_impulse_response;
use barrido_core::{Result, Signal};

use crate::aliasing::AliasingCompensation;
use crate::nonlinear::NonlinearFunction;

/// Where a branch returns to the input rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DownsamplingPosition {
    /// Postprocess right after the nonlinearity; the filter runs at the input rate.
    #[default]
    AfterNonlinearBlock,
    /// Filter at the preprocessed rate and postprocess the filtered signal.
    AfterLinearBlock,
}

/// One nonlinear-plus-linear path.
///
/// The output is computed eagerly: on construction and on every
/// [`set_input`](Self::set_input).
#[derive(Debug)]
pub struct HammersteinBranch {
    input: Signal,
    nonlinear: Arc<dyn NonlinearFunction>,
    filter: Signal,
    aliasing: Box<dyn AliasingCompensation>,
    position: DownsamplingPosition,
    output: Signal,
}

impl HammersteinBranch {
    /// Build a branch and evaluate it for `input`.
    pub fn new(
        input: Signal,
        nonlinear: Arc<dyn NonlinearFunction>,
        filter: Signal,
        aliasing: Box<dyn AliasingCompensation>,
        position: DownsamplingPosition,
    ) -> Result<Self> {
        let mut branch = Self {
            input: Signal::default(),
            nonlinear,
            filter,
            aliasing,
            position,
            output: Signal::default(),
        };
        branch.set_input(input)?;
        Ok(branch)
    }

    /// Replace the input and recompute the output.
    ///
    /// On error the previous input and output are kept.
    pub fn set_input(&mut self, input: Signal) -> Result<()> {
        let output = self.evaluate(&input)?;
        self.commit(input, output);
        Ok(())
    }

    /// Run the pipeline for `input` without storing the result.
    pub(crate) fn evaluate(&mut self, input: &Signal) -> Result<Signal> {
        let harmonics = self.nonlinear.maximum_harmonics();
        let prepared = self.aliasing.preprocess(input, harmonics)?;
        let distorted = self.nonlinear.apply(&prepared)?;

        let output = match self.position {
            DownsamplingPosition::AfterNonlinearBlock => {
                let restored = self.aliasing.postprocess(&distorted)?;
                linear_block(&restored, &self.filter)?
            }
            DownsamplingPosition::AfterLinearBlock => {
                let attenuated = distorted.multiply(&self.aliasing.attenuation_curve()?)?;
                let filtered = linear_block(&attenuated, &self.filter)?;
                self.aliasing.postprocess(&filtered)?
            }
        };
        tracing::debug!(
            position = ?self.position,
            harmonics,
            input_len = input.len(),
            output_len = output.len(),
            "evaluated Hammerstein branch"
        );
        Ok(output)
    }

    pub(crate) fn commit(&mut self, input: Signal, output: Signal) {
        self.input = input;
        self.output = output;
    }

    /// Current input.
    pub fn input(&self) -> &Signal {
        &self.input
    }

    /// Output for the current input.
    pub fn output(&self) -> &Signal {
        &self.output
    }

    /// Linear filter, at its own sampling rate.
    pub fn filter_impulse_response(&self) -> &Signal {
        &self.filter
    }

    /// Static nonlinearity.
    pub fn nonlinear_function(&self) -> &Arc<dyn NonlinearFunction> {
        &self.nonlinear
    }

    /// This branch's private aliasing compensation.
    pub fn aliasing_compensation(&self) -> &dyn AliasingCompensation {
        self.aliasing.as_ref()
    }

    /// Where the branch downsamples.
    pub fn downsampling_position(&self) -> DownsamplingPosition {
        self.position
    }
}

/// Circular convolution of `signal` with `filter` at the signal's rate.
///
/// A filter at another rate is first zero-padded so that, once resampled, it spans
/// at least the signal; its wrapped-around (acausal) part then stays at the end of
/// the common buffer.
fn linear_block(signal: &Signal, filter: &Signal) -> Result<Signal> {
    if filter.sampling_rate() == signal.sampling_rate() {
        return circular_convolve(signal, filter);
    }
    let ratio = signal.sampling_rate() / filter.sampling_rate();
    let span = (signal.len() as f64 / ratio).ceil() as usize;
    let filter = resample_impulse_response(
        &filter.zero_padded(filter.len().max(span)),
        signal.sampling_rate(),
    )?;
    circular_convolve(signal, &filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliasing::{FullUpsamplingAliasingCompensation, NoAliasingCompensation};
    use crate::nonlinear::Power;
    use barrido_core::Error;

    fn ramp(len: usize) -> Signal {
        Signal::mono((0..len).map(|i| i as f64 / len as f64).collect(), 48000.0, "ramp").unwrap()
    }

    fn branch(degree: u32, filter: Signal, position: DownsamplingPosition) -> HammersteinBranch {
        HammersteinBranch::new(
            ramp(64),
            Arc::new(Power::new(degree).unwrap()),
            filter,
            Box::new(NoAliasingCompensation::new()),
            position,
        )
        .unwrap()
    }

    #[test]
    fn identity_branch_reproduces_input() {
        let b = branch(1, Signal::impulse(48000.0, 16).unwrap(), DownsamplingPosition::default());
        let out = b.output().channel(0).unwrap();
        assert_eq!(out.len(), 64);
        for (a, e) in out.iter().zip(ramp(64).channel(0).unwrap()) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn longer_filter_pads_output() {
        let b = branch(1, Signal::impulse(48000.0, 100).unwrap(), DownsamplingPosition::default());
        assert_eq!(b.output().len(), 100);
        assert!(b.output().channel(0).unwrap()[64..].iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn delay_filter_shifts_squared_input() {
        let mut delay = vec![0.0; 8];
        delay[2] = 1.0;
        let filter = Signal::mono(delay, 48000.0, "delay").unwrap();
        let b = branch(2, filter, DownsamplingPosition::AfterLinearBlock);
        let x = ramp(64);
        let out = b.output().channel(0).unwrap();
        for i in 2..64 {
            let expected = x.channel(0).unwrap()[i - 2].powi(2);
            assert!((out[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn set_input_keeps_state_on_error() {
        let stereo_filter = Signal::new(vec![vec![1.0, 0.0]; 2], 48000.0, Vec::new()).unwrap();
        let mut b = branch(1, stereo_filter, DownsamplingPosition::default());
        assert_eq!(b.output().channel_count(), 2);
        let before = b.output().clone();

        let three_channels = Signal::new(vec![vec![0.5; 8]; 3], 48000.0, Vec::new()).unwrap();
        assert!(matches!(
            b.set_input(three_channels),
            Err(Error::ChannelMismatch { left: 3, right: 2 })
        ));
        assert_eq!(b.input(), &ramp(64));
        assert_eq!(b.output(), &before);
    }

    #[test]
    fn upsampled_branch_returns_at_input_rate() {
        for position in [
            DownsamplingPosition::AfterNonlinearBlock,
            DownsamplingPosition::AfterLinearBlock,
        ] {
            let b = HammersteinBranch::new(
                ramp(256),
                Arc::new(Power::new(3).unwrap()),
                Signal::impulse(48000.0, 128).unwrap(),
                Box::new(FullUpsamplingAliasingCompensation::new()),
                position,
            )
            .unwrap();
            assert_eq!(b.output().sampling_rate(), 48000.0);
            assert_eq!(b.output().len(), 256);
        }
    }

    #[test]
    fn linear_block_resamples_filter() {
        let signal = Signal::mono(vec![1.0; 30], 96000.0, "").unwrap();
        let filter = Signal::impulse(48000.0, 4).unwrap();
        let out = linear_block(&signal, &filter).unwrap();
        assert_eq!(out.sampling_rate(), 96000.0);
        assert_eq!(out.len(), 30);
        // Constant input through a unit-DC-gain filter stays constant
        for x in out.channel(0).unwrap() {
            assert!((x - 1.0).abs() < 1e-9, "{}", x);
        }
    }
}
