//! Aliasing compensation around the nonlinear block.
//!
//! A nonlinearity of degree `n` spreads a band-limited input over `n` times its
//! bandwidth; whatever lands above Nyquist folds back into the band. Compensation
//! strategies wrap the nonlinearity:
//!
//! 1. **Preprocess**: prepare the input (e.g. upsample by the harmonic count)
//! 2. **Nonlinearity**: runs on the prepared signal
//! 3. **Postprocess**: undo the preparation (e.g. lowpass and decimate)
//!
//! A preprocess call and its postprocess call share state (the factor chosen for
//! the input), so every branch owns its own instance; [`AliasingCompensation::spawn`]
//! creates a fresh one of the same strategy.

use std::fmt;

use barrido_analysis::resample::{decimate, interpolate};
use barrido_core::{Error, Result, Signal};

/// Strategy that suppresses aliasing introduced by a nonlinearity.
pub trait AliasingCompensation: Send + fmt::Debug {
    /// Prepare `input` for a nonlinearity producing up to `max_harmonics` harmonics.
    fn preprocess(&mut self, input: &Signal, max_harmonics: usize) -> Result<Signal>;

    /// Undo the preparation of the matching [`preprocess`](Self::preprocess) call.
    fn postprocess(&mut self, input: &Signal) -> Result<Signal>;

    /// Gain curve applied to the nonlinearity's output when downsampling is
    /// deferred until after the linear block.
    ///
    /// Has the length and sampling rate of the last preprocessed signal.
    fn attenuation_curve(&self) -> Result<Signal>;

    /// A new instance of the same strategy with clean state.
    fn spawn(&self) -> Box<dyn AliasingCompensation>;
}

impl Clone for Box<dyn AliasingCompensation> {
    fn clone(&self) -> Self {
        self.spawn()
    }
}

/// Shape of the last preprocessed signal.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Prepared {
    length: usize,
    sampling_rate: f64,
}

impl Prepared {
    fn of(signal: &Signal) -> Self {
        Self {
            length: signal.len(),
            sampling_rate: signal.sampling_rate(),
        }
    }

    fn unity(self) -> Result<Signal> {
        Signal::constant(1.0, 1, self.length, self.sampling_rate)
    }
}

fn not_prepared() -> Error {
    Error::state("attenuation curve requested before preprocessing")
}

/// Pass-through: the nonlinearity runs at the input rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoAliasingCompensation {
    prepared: Option<Prepared>,
}

impl NoAliasingCompensation {
    /// Create a pass-through compensation.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AliasingCompensation for NoAliasingCompensation {
    fn preprocess(&mut self, input: &Signal, _max_harmonics: usize) -> Result<Signal> {
        self.prepared = Some(Prepared::of(input));
        Ok(input.clone())
    }

    fn postprocess(&mut self, input: &Signal) -> Result<Signal> {
        Ok(input.clone())
    }

    fn attenuation_curve(&self) -> Result<Signal> {
        self.prepared.ok_or_else(not_prepared)?.unity()
    }

    fn spawn(&self) -> Box<dyn AliasingCompensation> {
        Box::new(Self::new())
    }
}

/// Upsample by the nonlinearity's harmonic count so that every harmonic stays
/// below the raised Nyquist frequency, then lowpass and decimate back.
///
/// Resampling uses the delay-compensated polyphase filters of
/// [`barrido_analysis::resample`], so the output is time-aligned with the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullUpsamplingAliasingCompensation {
    filter_order: usize,
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    factor: usize,
    prepared: Prepared,
}

impl FullUpsamplingAliasingCompensation {
    /// Create an upsampling compensation with the default resampling filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `filter_order` taps for the resampling lowpass (`0` picks the default).
    pub fn with_filter_order(filter_order: usize) -> Self {
        Self {
            filter_order,
            pending: None,
        }
    }

    /// Upsampling factor chosen by the last preprocess call still awaiting its
    /// postprocess call.
    pub fn pending_factor(&self) -> Option<usize> {
        self.pending.map(|p| p.factor)
    }
}

impl AliasingCompensation for FullUpsamplingAliasingCompensation {
    fn preprocess(&mut self, input: &Signal, max_harmonics: usize) -> Result<Signal> {
        let factor = max_harmonics.max(1);
        let channels = input
            .channels()
            .iter()
            .map(|c| interpolate(c, factor, self.filter_order))
            .collect();
        let upsampled = Signal::new(
            channels,
            input.sampling_rate() * factor as f64,
            input.labels().to_vec(),
        )?;
        tracing::debug!(factor, rate = upsampled.sampling_rate(), "upsampled for nonlinearity");
        self.pending = Some(Pending {
            factor,
            prepared: Prepared::of(&upsampled),
        });
        Ok(upsampled)
    }

    fn postprocess(&mut self, input: &Signal) -> Result<Signal> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::state("postprocess called without a matching preprocess"))?;
        if input.sampling_rate() != pending.prepared.sampling_rate {
            return Err(Error::SampleRateMismatch {
                left: input.sampling_rate(),
                right: pending.prepared.sampling_rate,
            });
        }
        let channels = input
            .channels()
            .iter()
            .map(|c| decimate(c, pending.factor, self.filter_order))
            .collect();
        Signal::new(
            channels,
            input.sampling_rate() / pending.factor as f64,
            input.labels().to_vec(),
        )
    }

    fn attenuation_curve(&self) -> Result<Signal> {
        self.pending.ok_or_else(not_prepared)?.prepared.unity()
    }

    fn spawn(&self) -> Box<dyn AliasingCompensation> {
        Box::new(Self::with_filter_order(self.filter_order))
    }
}
