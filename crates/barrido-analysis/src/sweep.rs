//! Phase-synchronized exponential sweeps (Novak method) and their analytic inverse.
//!
//! A classic exponential sine sweep (see Farina, 2000) separates the harmonic
//! impulse responses of a weakly nonlinear system in time, but each harmonic carries
//! an arbitrary phase offset. Novak et al. quantize the sweep's excitation rate `L`
//! so that the sweep starts and ends on a whole number of periods of the start
//! frequency. With that constraint every harmonic is an exact time shift of the
//! fundamental sweep:
//!
//! ```text
//! θ(t) = 2π f1 L (e^{t/L} − 1)
//! θ(t + L·ln k) = k·θ(t) + 2π f1 L (k − 1)      (the last term is a multiple of 2π)
//! ```
//!
//! so the `k`-th harmonic impulse response appears `L·ln k` seconds *before* the
//! linear one after deconvolution. The deconvolution filter is known in closed form
//! in the frequency domain and is evaluated directly, not by spectral division.
//!
//! # References
//!
//! - A. Novak, L. Simon, F. Kadlec, P. Lotton, "Nonlinear System Identification Using
//!   Exponential Swept-Sine Signal", IEEE Trans. Instrum. Meas. 59(8), 2010.
//! - A. Novak, P. Lotton, L. Simon, "Synchronized Swept-Sine: Theory, Application, and
//!   Implementation", J. Audio Eng. Soc. 63(10), 2015.
//!
//! # Example
//!
//! ```rust
//! use barrido_analysis::sweep::{NovakSweep, SweepParameters};
//!
//! let params = SweepParameters::new(44100.0, 20.0, 20000.0, 44100);
//! let sweep = NovakSweep::sine(params).unwrap();
//!
//! assert!((sweep.excitation_rate().unwrap() - 0.15).abs() < 1e-12);
//! let signal = sweep.generate().unwrap();
//! assert_eq!(signal.len() % 2, 0);
//! ```

use std::f64::consts::{FRAC_PI_4, PI};

use barrido_core::{Error, Result, Signal};
use rustfft::num_complex::Complex;

use crate::convolve::circular_convolve;
use crate::fft::Fft;

/// Label of generated sweep signals.
pub const SWEEP_LABEL: &str = "Sweep signal";

/// Label of generated inverse filters.
pub const INVERSE_LABEL: &str = "Inverse sweep";

/// Which trigonometric function drives the sweep.
///
/// The two variants are phase-orthogonal; measuring with both separates even from
/// odd harmonic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPhase {
    /// `sin θ(t)`, inverse phase offset `+π/4`.
    #[default]
    Sine,
    /// `cos θ(t)`, inverse phase offset `−π/4`.
    Cosine,
}

impl SweepPhase {
    fn inverse_phase_offset(self) -> f64 {
        match self {
            SweepPhase::Sine => FRAC_PI_4,
            SweepPhase::Cosine => -FRAC_PI_4,
        }
    }
}

/// Parameters of a Novak sweep.
///
/// Fade lengths are in samples; [`SweepParameters::with_fade_secs`] converts from
/// seconds the way the measurement workflow specifies them.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParameters {
    /// Sampling rate in Hz.
    pub sampling_rate: f64,
    /// Start frequency `f1` in Hz.
    pub start_frequency: f64,
    /// Stop frequency `f2` in Hz.
    pub stop_frequency: f64,
    /// Target length in samples; the generated sweep is close to, not exactly, this.
    pub approximate_length: usize,
    /// Raised-cosine fade-in length in samples.
    pub fade_in: usize,
    /// Raised-cosine fade-out length in samples.
    pub fade_out: usize,
    /// Uniform amplitude multiplier.
    pub amplitude: f64,
}

/// Default start frequency in Hz.
pub const DEFAULT_START_FREQUENCY: f64 = 20.0;
/// Default stop frequency in Hz.
pub const DEFAULT_STOP_FREQUENCY: f64 = 20000.0;
/// Default fade-in and fade-out duration in seconds.
pub const DEFAULT_FADE_SECS: f64 = 0.02;
/// Default target length in samples.
pub const DEFAULT_APPROXIMATE_LENGTH: usize = 1 << 16;

impl Default for SweepParameters {
    fn default() -> Self {
        let sampling_rate = barrido_core::DEFAULT_SAMPLING_RATE;
        Self::new(
            sampling_rate,
            DEFAULT_START_FREQUENCY,
            DEFAULT_STOP_FREQUENCY,
            DEFAULT_APPROXIMATE_LENGTH,
        )
        .with_fade_secs(DEFAULT_FADE_SECS, DEFAULT_FADE_SECS)
    }
}

impl SweepParameters {
    /// Parameters without fades and with unit amplitude.
    pub fn new(
        sampling_rate: f64,
        start_frequency: f64,
        stop_frequency: f64,
        approximate_length: usize,
    ) -> Self {
        Self {
            sampling_rate,
            start_frequency,
            stop_frequency,
            approximate_length,
            fade_in: 0,
            fade_out: 0,
            amplitude: 1.0,
        }
    }

    /// Set the fades from durations in seconds (truncated to whole samples).
    pub fn with_fade_secs(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = secs_to_samples(fade_in, self.sampling_rate);
        self.fade_out = secs_to_samples(fade_out, self.sampling_rate);
        self
    }

    /// Set the fades in samples.
    pub fn with_fades(mut self, fade_in: usize, fade_out: usize) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    /// Set the amplitude multiplier.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Check the frequency bounds, rate, length and amplitude.
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(Error::domain(format!(
                "sampling rate must be finite and positive, got {}",
                self.sampling_rate
            )));
        }
        if !(self.start_frequency.is_finite() && self.start_frequency > 0.0) {
            return Err(Error::domain(format!(
                "start frequency must be finite and positive, got {}",
                self.start_frequency
            )));
        }
        if !(self.stop_frequency.is_finite() && self.stop_frequency > self.start_frequency) {
            return Err(Error::domain(format!(
                "stop frequency ({}) must be above the start frequency ({})",
                self.stop_frequency, self.start_frequency
            )));
        }
        if self.approximate_length == 0 {
            return Err(Error::domain("sweep length must be positive"));
        }
        validate_amplitude(self.amplitude)
    }
}

fn secs_to_samples(secs: f64, sampling_rate: f64) -> usize {
    // Saturating float cast: negative or NaN durations become 0
    (secs * sampling_rate) as usize
}

fn validate_amplitude(amplitude: f64) -> Result<()> {
    if amplitude.is_finite() && amplitude > 0.0 {
        Ok(())
    } else {
        Err(Error::domain(format!(
            "amplitude must be finite and positive, got {amplitude}"
        )))
    }
}

/// Novak sweep generator (sine or cosine variant).
///
/// Derived quantities ([`excitation_rate`](Self::excitation_rate),
/// [`actual_length`](Self::actual_length)) are recomputed from the current
/// parameters on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct NovakSweep {
    params: SweepParameters,
    phase: SweepPhase,
}

impl NovakSweep {
    /// Create a generator after validating `params`.
    pub fn new(params: SweepParameters, phase: SweepPhase) -> Result<Self> {
        params.validate()?;
        let sweep = Self { params, phase };
        // Reject lengths too short to hold a single period of f1
        sweep.actual_length()?;
        Ok(sweep)
    }

    /// Sine-variant generator.
    pub fn sine(params: SweepParameters) -> Result<Self> {
        Self::new(params, SweepPhase::Sine)
    }

    /// Cosine-variant generator.
    pub fn cosine(params: SweepParameters) -> Result<Self> {
        Self::new(params, SweepPhase::Cosine)
    }

    /// Replace all parameters. On error the previous parameters are kept.
    pub fn configure(&mut self, params: SweepParameters) -> Result<()> {
        let candidate = Self::new(params, self.phase)?;
        *self = candidate;
        Ok(())
    }

    /// Set the target length in samples. On error the previous length is kept.
    pub fn set_length(&mut self, approximate_length: usize) -> Result<()> {
        let params = SweepParameters {
            approximate_length,
            ..self.params.clone()
        };
        self.configure(params)
    }

    /// Current parameters.
    pub fn parameters(&self) -> &SweepParameters {
        &self.params
    }

    /// Sine or cosine variant.
    pub fn phase(&self) -> SweepPhase {
        self.phase
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        self.params.sampling_rate
    }

    /// Start frequency in Hz.
    pub fn start_frequency(&self) -> f64 {
        self.params.start_frequency
    }

    /// Stop frequency in Hz.
    pub fn stop_frequency(&self) -> f64 {
        self.params.stop_frequency
    }

    /// Target length in samples.
    pub fn approximate_length(&self) -> usize {
        self.params.approximate_length
    }

    /// Fade-in length in samples.
    pub fn fade_in(&self) -> usize {
        self.params.fade_in
    }

    /// Fade-out length in samples.
    pub fn fade_out(&self) -> usize {
        self.params.fade_out
    }

    /// Amplitude multiplier of the forward sweep.
    pub fn amplitude_scale(&self) -> f64 {
        self.params.amplitude
    }

    /// Set the amplitude multiplier; must be finite and positive.
    pub fn set_amplitude_scale(&mut self, amplitude: f64) -> Result<()> {
        validate_amplitude(amplitude)?;
        self.params.amplitude = amplitude;
        Ok(())
    }

    /// Excitation rate `L` in seconds.
    ///
    /// ```text
    /// L = round((N/fs) · f1 / ln(f2/f1)) / f1
    /// ```
    ///
    /// `L·f1` is an integer, which is what synchronizes the harmonics.
    pub fn excitation_rate(&self) -> Result<f64> {
        let p = &self.params;
        let octaves = (p.stop_frequency / p.start_frequency).ln();
        let periods = (p.approximate_length as f64 / p.sampling_rate) * p.start_frequency / octaves;
        let l = periods.round() / p.start_frequency;
        if !(l.is_finite() && l > 0.0) {
            return Err(Error::domain(format!(
                "excitation rate {l} is not positive; a length of {} samples is too short \
                 for a sweep from {} Hz to {} Hz",
                p.approximate_length, p.start_frequency, p.stop_frequency
            )));
        }
        Ok(l)
    }

    /// Number of samples of the sweep before the even-length correction,
    /// `round(fs · L · ln(f2/f1) − 1)`.
    pub fn actual_length(&self) -> Result<usize> {
        let p = &self.params;
        let duration = self.excitation_rate()? * (p.stop_frequency / p.start_frequency).ln();
        let length = (p.sampling_rate * duration - 1.0).round();
        if !(length.is_finite() && length >= 1.0) {
            return Err(Error::domain(format!(
                "sweep of {duration} s at {} Hz has no samples",
                p.sampling_rate
            )));
        }
        Ok(length as usize)
    }

    /// Time advance `L·ln(order)` in seconds of the `order`-th harmonic impulse
    /// response relative to the linear one.
    pub fn harmonic_offset(&self, order: usize) -> Result<f64> {
        if order == 0 {
            return Err(Error::domain("harmonic order starts at 1"));
        }
        Ok(self.excitation_rate()? * (order as f64).ln())
    }

    /// Generate the forward sweep.
    ///
    /// The result has an even number of samples: an odd `actual_length` loses its
    /// last sample after fading.
    pub fn generate(&self) -> Result<Signal> {
        let p = &self.params;
        let l = self.excitation_rate()?;
        let length = self.actual_length()?;
        let omega = 2.0 * PI * p.start_frequency * l;

        let mut samples: Vec<f64> = (0..length)
            .map(|k| {
                let t = k as f64 / p.sampling_rate;
                let theta = omega * ((t / l).exp() - 1.0);
                match self.phase {
                    SweepPhase::Sine => theta.sin(),
                    SweepPhase::Cosine => theta.cos(),
                }
            })
            .collect();

        apply_fades(&mut samples, p.fade_in, p.fade_out);

        if samples.len() % 2 != 0 {
            samples.pop();
        }
        for s in &mut samples {
            *s *= p.amplitude;
        }

        tracing::debug!(
            phase = ?self.phase,
            excitation_rate = l,
            actual_length = length,
            len = samples.len(),
            "generated sweep"
        );
        Signal::mono(samples, p.sampling_rate, SWEEP_LABEL)
    }

    /// Generate the analytic inverse filter.
    ///
    /// `length` defaults to [`actual_length`](Self::actual_length); the filter has
    /// `2·floor(length/2)` samples. Its spectrum is
    ///
    /// ```text
    /// X̃(f) = 2·sqrt(f/L) · exp(j·(2π L f (f1/f + ln(f/f1) − 1) ± π/4))
    /// ```
    ///
    /// with the DC bin set to zero, scaled by `1/amplitude` so that the round trip
    /// through [`generate`](Self::generate) is independent of the amplitude. The
    /// filter carries no `1/fs` normalisation, so that round trip peaks near
    /// `0.87·N` rather than at 1.
    pub fn generate_inverse(&self, length: Option<usize>) -> Result<Signal> {
        let p = &self.params;
        let length = match length {
            Some(n) => n,
            None => self.actual_length()?,
        };
        let half = length / 2;
        if half == 0 {
            return Err(Error::domain(format!(
                "an inverse filter needs at least 2 samples, got {length}"
            )));
        }
        let l = self.excitation_rate()?;
        let f1 = p.start_frequency;
        let step = p.sampling_rate / 2.0 / half as f64;
        let offset = self.phase.inverse_phase_offset();

        let mut bins = Vec::with_capacity(half + 1);
        bins.push(Complex::new(0.0, 0.0));
        bins.extend((1..=half).map(|k| {
            let f = k as f64 * step;
            let magnitude = 2.0 * (f / l).sqrt();
            let phase = 2.0 * PI * l * f * (f1 / f + (f / f1).ln() - 1.0) + offset;
            Complex::from_polar(magnitude, phase)
        }));

        let n = 2 * half;
        let scale = 1.0 / p.amplitude;
        let samples: Vec<f64> = Fft::new(n)
            .inverse_real(&bins)
            .into_iter()
            .map(|x| x * scale)
            .collect();

        tracing::debug!(phase = ?self.phase, len = n, "generated inverse sweep");
        Signal::mono(samples, p.sampling_rate, INVERSE_LABEL)
    }

    /// Deconvolve a system's response to this sweep.
    ///
    /// The response is zero-padded to an even length of at least the sweep's and
    /// circularly convolved with an inverse filter of that length. The linear
    /// impulse response starts at sample 0; the `k`-th harmonic response is wrapped
    /// around to start [`harmonic_offset`](Self::harmonic_offset)`(k)` seconds
    /// before the end of the buffer.
    pub fn deconvolve(&self, response: &Signal) -> Result<Signal> {
        let actual = self.actual_length()?;
        let generated = actual - actual % 2;
        let mut length = response.len().max(generated);
        length += length % 2;
        let inverse = self.generate_inverse(Some(length))?;
        let response = response.zero_padded(length);
        circular_convolve(&response, &inverse)
    }

    /// Cut the first `count` harmonic impulse responses out of a deconvolved signal.
    ///
    /// Harmonic `k` (1-based) starts at sample `(N − round(L·ln k · fs)) mod N` and
    /// spans `ir_length` samples, reading circularly. Element `0` of the result is
    /// the linear impulse response.
    pub fn harmonic_impulse_responses(
        &self,
        deconvolved: &Signal,
        count: usize,
        ir_length: usize,
    ) -> Result<Vec<Signal>> {
        let n = deconvolved.len();
        if ir_length == 0 || ir_length > n {
            return Err(Error::domain(format!(
                "impulse response length {ir_length} must be in 1..={n}"
            )));
        }
        (1..=count)
            .map(|order| {
                let advance = (self.harmonic_offset(order)? * self.sampling_rate()).round() as usize;
                if advance >= n {
                    return Err(Error::domain(format!(
                        "harmonic {order} lies {advance} samples before the linear response, \
                         beyond the {n}-sample buffer"
                    )));
                }
                let start = (n - advance) % n;
                let channels = deconvolved
                    .channels()
                    .iter()
                    .map(|c| (0..ir_length).map(|i| c[(start + i) % n]).collect())
                    .collect();
                let labels = deconvolved
                    .labels()
                    .iter()
                    .map(|label| {
                        if label.is_empty() {
                            format!("Harmonic {order}")
                        } else {
                            format!("{label} (harmonic {order})")
                        }
                    })
                    .collect();
                Signal::new(channels, self.sampling_rate(), labels)
            })
            .collect()
    }
}

/// Raised-cosine fades over the first `fade_in` and last `fade_out` samples.
fn apply_fades(samples: &mut [f64], fade_in: usize, fade_out: usize) {
    let len = samples.len();
    let clamp = |fade: usize, which: &str| {
        if fade > len {
            tracing::warn!(fade, len, which, "fade longer than the sweep; clamping");
            len
        } else {
            fade
        }
    };
    let fade_in = clamp(fade_in, "fade-in");
    let fade_out = clamp(fade_out, "fade-out");

    for (k, s) in samples[..fade_in].iter_mut().enumerate() {
        *s *= (1.0 - (PI * k as f64 / fade_in as f64).cos()) / 2.0;
    }
    for (k, s) in samples[len - fade_out..].iter_mut().enumerate() {
        *s *= ((PI * k as f64 / fade_out as f64).cos() + 1.0) / 2.0;
    }
}
