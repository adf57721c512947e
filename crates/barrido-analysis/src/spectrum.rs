//! Spectra of [`Signal`]s and the forward/inverse Fourier transform between them.
//!
//! A [`Spectrum`] remembers the length of the signal it was computed from, so
//! [`inverse_fourier_transform`] restores odd lengths exactly instead of dropping
//! the last sample.

use barrido_core::{Error, Result, Signal, broadcast_count};
use rustfft::num_complex::Complex;

use crate::fft::Fft;

/// Positive-frequency spectrum (DC to Nyquist) of every channel of a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    channels: Vec<Vec<Complex<f64>>>,
    sampling_rate: f64,
    labels: Vec<String>,
    signal_length: usize,
}

impl Spectrum {
    /// Create a spectrum from per-channel bins.
    ///
    /// `signal_length` is the time-domain length; every channel must hold
    /// `signal_length / 2 + 1` bins.
    pub fn new(
        channels: Vec<Vec<Complex<f64>>>,
        sampling_rate: f64,
        labels: Vec<String>,
        signal_length: usize,
    ) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::InvalidSignal("a spectrum needs at least one channel".into()));
        }
        let bins = signal_length / 2 + 1;
        if let Some(bad) = channels.iter().position(|c| c.len() != bins) {
            return Err(Error::InvalidSignal(format!(
                "spectrum channel {bad} has {} bins, expected {bins}",
                channels[bad].len()
            )));
        }
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(Error::InvalidSignal(format!(
                "sampling rate must be finite and positive, got {sampling_rate}"
            )));
        }
        let mut labels = labels;
        labels.resize(channels.len(), String::new());
        Ok(Self {
            channels,
            sampling_rate,
            labels,
            signal_length,
        })
    }

    /// Bins of one channel.
    pub fn channel(&self, index: usize) -> Option<&[Complex<f64>]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<Complex<f64>>] {
        &self.channels
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of bins per channel.
    pub fn bins(&self) -> usize {
        self.signal_length / 2 + 1
    }

    /// Bin spacing in Hz (`sampling_rate / signal_length`).
    pub fn resolution(&self) -> f64 {
        self.sampling_rate / self.signal_length.max(1) as f64
    }

    /// Length of the time-domain signal this spectrum describes.
    pub fn signal_length(&self) -> usize {
        self.signal_length
    }

    /// Sampling rate of the time-domain signal.
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Channel labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Frequency of bin `k` in Hz.
    pub fn frequency(&self, k: usize) -> f64 {
        k as f64 * self.resolution()
    }

    /// Bin-wise product of two spectra of the same signal length.
    ///
    /// A single-channel operand is broadcast over the other's channels.
    pub fn multiply(&self, other: &Spectrum) -> Result<Self> {
        if self.signal_length != other.signal_length {
            return Err(Error::LengthMismatch {
                left: self.signal_length,
                right: other.signal_length,
            });
        }
        if self.sampling_rate != other.sampling_rate {
            return Err(Error::SampleRateMismatch {
                left: self.sampling_rate(),
                right: other.sampling_rate(),
            });
        }
        let count = broadcast_count(self.channel_count(), other.channel_count())?;
        let channels = (0..count)
            .map(|i| {
                let a = &self.channels[i.min(self.channel_count() - 1)];
                let b = &other.channels[i.min(other.channel_count() - 1)];
                a.iter().zip(b).map(|(x, y)| x * y).collect()
            })
            .collect();
        let labels = if self.channel_count() >= other.channel_count() {
            self.labels.clone()
        } else {
            other.labels.clone()
        };
        Ok(Self {
            channels,
            sampling_rate: self.sampling_rate,
            labels,
            signal_length: self.signal_length,
        })
    }
}

/// Forward Fourier transform of every channel of a non-empty signal.
pub fn fourier_transform(signal: &Signal) -> Result<Spectrum> {
    let n = signal.len();
    if n == 0 {
        return Err(Error::InvalidSignal(
            "cannot transform an empty signal".into(),
        ));
    }
    let fft = Fft::new(n);
    let channels = signal
        .channels()
        .iter()
        .map(|c| fft.forward_real(c))
        .collect();
    Spectrum::new(
        channels,
        signal.sampling_rate(),
        signal.labels().to_vec(),
        n,
    )
}

/// Inverse Fourier transform back to a signal of the original length.
pub fn inverse_fourier_transform(spectrum: &Spectrum) -> Result<Signal> {
    let n = spectrum.signal_length();
    if n == 0 {
        return Err(Error::InvalidSignal(
            "cannot inverse-transform an empty spectrum".into(),
        ));
    }
    let fft = Fft::new(n);
    let channels = spectrum
        .channels()
        .iter()
        .map(|c| fft.inverse_real(c))
        .collect();
    Signal::new(channels, spectrum.sampling_rate(), spectrum.labels().to_vec())
}
