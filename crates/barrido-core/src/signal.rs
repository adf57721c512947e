//! Immutable multi-channel sample buffer.
//!
//! A [`Signal`] is a value: cloning copies the samples, equality compares the
//! samples, the sampling rate and the channel labels. Every operation returns a
//! new signal.

use crate::error::{Error, Result};

/// Sampling rate used by [`Signal::default`].
pub const DEFAULT_SAMPLING_RATE: f64 = 48000.0;

/// An ordered set of equally long sample channels with a sampling rate and labels.
///
/// # Example
///
/// ```rust
/// use barrido_core::Signal;
///
/// let signal = Signal::mono(vec![0.0, 0.5, 1.0], 48000.0, "ramp").unwrap();
/// assert_eq!(signal.len(), 3);
/// assert_eq!(signal.channel(0), Some(&[0.0, 0.5, 1.0][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    channels: Vec<Vec<f64>>,
    sampling_rate: f64,
    labels: Vec<String>,
}

impl Default for Signal {
    /// One empty channel at [`DEFAULT_SAMPLING_RATE`].
    fn default() -> Self {
        Self {
            channels: vec![Vec::new()],
            sampling_rate: DEFAULT_SAMPLING_RATE,
            labels: vec![String::new()],
        }
    }
}

impl Signal {
    /// Create a signal from channels, a sampling rate and labels.
    ///
    /// Labels are padded with empty strings (or truncated) to the channel count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignal`] if there are no channels, the channels differ
    /// in length, or the sampling rate is not a finite positive number.
    pub fn new(channels: Vec<Vec<f64>>, sampling_rate: f64, labels: Vec<String>) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::InvalidSignal("a signal needs at least one channel".into()));
        }
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(Error::InvalidSignal(format!(
                "sampling rate must be finite and positive, got {sampling_rate}"
            )));
        }
        let len = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != len) {
            return Err(Error::InvalidSignal(format!(
                "channel {bad} has {} samples, expected {len}",
                channels[bad].len()
            )));
        }

        let mut labels = labels;
        labels.resize(channels.len(), String::new());

        Ok(Self {
            channels,
            sampling_rate,
            labels,
        })
    }

    /// Create a single-channel signal.
    pub fn mono(samples: Vec<f64>, sampling_rate: f64, label: impl Into<String>) -> Result<Self> {
        Self::new(vec![samples], sampling_rate, vec![label.into()])
    }

    /// A unit impulse of `length` samples (`[1, 0, 0, ...]`).
    pub fn impulse(sampling_rate: f64, length: usize) -> Result<Self> {
        let mut samples = vec![0.0; length];
        if let Some(first) = samples.first_mut() {
            *first = 1.0;
        }
        Self::mono(samples, sampling_rate, "Impulse")
    }

    /// A constant-valued signal shaped like `channels` × `length`.
    pub fn constant(value: f64, channels: usize, length: usize, sampling_rate: f64) -> Result<Self> {
        Self::new(vec![vec![value; length]; channels], sampling_rate, Vec::new())
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Whether the channels hold no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sampling_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Channel labels (one per channel).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Same samples and labels, different sampling rate.
    pub fn with_sampling_rate(&self, sampling_rate: f64) -> Result<Self> {
        Self::new(self.channels.clone(), sampling_rate, self.labels.clone())
    }

    /// Apply `f` to every sample of every channel.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            channels: self
                .channels
                .iter()
                .map(|c| c.iter().map(|&x| f(x)).collect())
                .collect(),
            sampling_rate: self.sampling_rate,
            labels: self.labels.clone(),
        }
    }

    /// Elementwise product of two equally long signals.
    ///
    /// A single-channel operand is broadcast over the other operand's channels;
    /// labels come from the operand with more channels.
    pub fn multiply(&self, other: &Signal) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise sum of two equally long signals.
    ///
    /// A single-channel operand is broadcast over the other operand's channels.
    pub fn add(&self, other: &Signal) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    fn zip_with(&self, other: &Signal, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        check_rates(self, other)?;
        let count = broadcast_count(self.channel_count(), other.channel_count())?;

        let channels = (0..count)
            .map(|i| {
                let a = &self.channels[i.min(self.channel_count() - 1)];
                let b = &other.channels[i.min(other.channel_count() - 1)];
                a.iter().zip(b).map(|(&x, &y)| op(x, y)).collect()
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
        })
    }

    /// Extend every channel with trailing zeros up to `length` samples.
    ///
    /// Never truncates: a signal that is already at least `length` long is returned
    /// unchanged.
    pub fn zero_padded(&self, length: usize) -> Self {
        if length <= self.len() {
            return self.clone();
        }
        let channels = self
            .channels
            .iter()
            .map(|c| {
                let mut c = c.clone();
                c.resize(length, 0.0);
                c
            })
            .collect();
        Self {
            channels,
            sampling_rate: self.sampling_rate,
            labels: self.labels.clone(),
        }
    }

    /// Samples `start..stop` of every channel (bounds are clamped to the signal).
    pub fn cut(&self, start: usize, stop: usize) -> Self {
        let stop = stop.min(self.len());
        let start = start.min(stop);
        Self {
            channels: self.channels.iter().map(|c| c[start..stop].to_vec()).collect(),
            sampling_rate: self.sampling_rate,
            labels: self.labels.clone(),
        }
    }

    /// Largest absolute sample value over all channels.
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, &x| acc.max(x.abs()))
    }

    /// Whether every sample is finite.
    pub fn is_finite(&self) -> bool {
        self.channels.iter().flatten().all(|x| x.is_finite())
    }
}

/// Zero-pad the shorter of two signals so both have the longer one's length.
///
/// This is the length-matching merge used before spectral multiplication: it never
/// discards samples.
pub fn merge_lengths(a: &Signal, b: &Signal) -> (Signal, Signal) {
    let length = a.len().max(b.len());
    (a.zero_padded(length), b.zero_padded(length))
}

fn check_rates(a: &Signal, b: &Signal) -> Result<()> {
    if a.sampling_rate != b.sampling_rate {
        return Err(Error::SampleRateMismatch {
            left: a.sampling_rate,
            right: b.sampling_rate,
        });
    }
    Ok(())
}

/// Resulting channel count when combining `left` and `right` channels, where a
/// single channel broadcasts.
pub fn broadcast_count(left: usize, right: usize) -> Result<usize> {
    match (left, right) {
        (l, r) if l == r => Ok(l),
        (1, r) => Ok(r),
        (l, 1) => Ok(l),
        (l, r) => Err(Error::ChannelMismatch { left: l, right: r }),
    }
}
