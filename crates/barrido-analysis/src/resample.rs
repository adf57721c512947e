//! Rational resampling: decimation, interpolation and arbitrary P/Q rate conversion.
//!
//! Implements polyphase FIR resampling using windowed-sinc lowpass filters with
//! Blackman windowing. Supports integer decimation, integer interpolation, and
//! rational P/Q resampling (e.g., 44100 → 48000 Hz via P=160, Q=147).
//!
//! # Theory
//!
//! Resampling by rational factor P/Q is equivalent to upsampling by P, applying
//! a lowpass filter at `min(1/P, 1/Q)` (normalized frequency), then downsampling
//! by Q. The polyphase decomposition avoids explicit zero-insertion by computing
//! only the output samples actually needed.
//!
//! The lowpass is linear phase; its group delay of `(taps - 1) / 2` samples at the
//! upsampled rate is compensated, so sample 0 of the output lines up with sample 0
//! of the input. This matters when the resampled signal is an impulse response.
//!
//! Reference: P. P. Vaidyanathan, *Multirate Systems and Filter Banks*, Prentice Hall,
//! 1993, Chapter 4.
//!
//! # Example
//!
//! ```rust
//! use barrido_analysis::resample::{decimate, interpolate, resample};
//!
//! let sr = 48000.0_f64;
//! let signal: Vec<f64> = (0..4800)
//!     .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / sr).sin())
//!     .collect();
//!
//! // Downsample 48 kHz → 24 kHz
//! let downsampled = decimate(&signal, 2, 0);
//! assert_eq!(downsampled.len(), signal.len() / 2);
//!
//! // Rational resampling: 44.1 kHz → 48 kHz
//! let resampled = resample(&signal, 160, 147, 0);
//! assert_eq!(resampled.len(), (4800usize * 160).div_ceil(147));
//! ```

use std::f64::consts::PI;

use barrido_core::{Error, Result, Signal};
use rustfft::num_complex::Complex;

use crate::fft::Fft;

/// Compute windowed-sinc lowpass FIR coefficients.
///
/// Designs a Type I linear-phase FIR lowpass filter using the windowed-sinc
/// method with a Blackman window. The filter is normalized to have unity gain
/// at DC (sum of coefficients = 1.0).
///
/// The impulse response is:
///   `h[n] = sinc(cutoff * (n - M/2)) * w_blackman[n]`
/// where sinc(x) = sin(π·x) / (π·x) and M = num_taps - 1.
///
/// # Arguments
///
/// * `num_taps` - Number of filter taps. Odd tap counts produce a symmetric
///   Type I filter.
/// * `cutoff` - Normalized cutoff frequency in the range (0.0, 1.0),
///   where 1.0 corresponds to the Nyquist frequency (fs/2).
///
/// Reference: A. V. Oppenheim and R. W. Schafer, *Discrete-Time Signal Processing*,
/// 3rd ed., Prentice Hall, 2009, Section 7.6.
pub fn design_lowpass(num_taps: usize, cutoff: f64) -> Vec<f64> {
    if num_taps == 0 {
        return Vec::new();
    }

    let m = num_taps - 1;
    let mut coeffs = Vec::with_capacity(num_taps);

    for n in 0..num_taps {
        let x = n as f64 - m as f64 / 2.0;

        let sinc = if x.abs() < 1e-12 {
            cutoff
        } else {
            (PI * cutoff * x).sin() / (PI * x)
        };

        // Blackman window: w[n] = 0.42 - 0.5*cos(2πn/M) + 0.08*cos(4πn/M)
        let window = if m == 0 {
            1.0
        } else {
            let phase = 2.0 * PI * n as f64 / m as f64;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        };

        coeffs.push(sinc * window);
    }

    // Normalize to unity DC gain (sum of coefficients = 1.0)
    let sum: f64 = coeffs.iter().sum();
    if sum.abs() > 1e-12 {
        for c in coeffs.iter_mut() {
            *c /= sum;
        }
    }

    coeffs
}

/// Compute the greatest common divisor of two integers.
fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Decimate a signal by an integer factor.
///
/// Applies a windowed-sinc anti-aliasing lowpass with cutoff at `0.9 / factor`
/// (normalized, leaving a 10% guard band), then keeps every `factor`-th sample.
/// Pass `filter_order = 0` for the default of `4 * factor * 10 + 1` taps.
///
/// Output length is `ceil(signal.len() / factor)`.
pub fn decimate(signal: &[f64], factor: usize, filter_order: usize) -> Vec<f64> {
    assert!(factor >= 1, "decimation factor must be >= 1");
    resample(signal, 1, factor, filter_order)
}

/// Interpolate a signal by an integer factor.
///
/// Zero-stuffs by `factor`, lowpass filters at `0.9 / factor` and scales by
/// `factor` to restore unity gain. Output length is `signal.len() * factor`.
pub fn interpolate(signal: &[f64], factor: usize, filter_order: usize) -> Vec<f64> {
    assert!(factor >= 1, "interpolation factor must be >= 1");
    resample(signal, factor, 1, filter_order)
}

/// Rational resampling by the factor P/Q.
///
/// # Algorithm
///
/// 1. Simplify P and Q by their GCD.
/// 2. Design a single prototype lowpass FIR with cutoff `0.9 / max(P, Q)`.
/// 3. For each output sample `m`, the position in the P-upsampled sequence is
///    `m * Q`; shifted by the filter's half length for delay compensation.
/// 4. Only prototype taps that land on non-zero (input) samples of the
///    zero-stuffed sequence are evaluated: those with `t ≡ m·Q + half (mod P)`.
///
/// # Arguments
///
/// * `signal` - Input samples at the source sample rate
/// * `p` - Upsampling factor (must be ≥ 1)
/// * `q` - Downsampling factor (must be ≥ 1)
/// * `filter_order` - Total prototype FIR length. Pass `0` for the automatic
///   default of `4 * max(P, Q) * 10 + 1` taps.
///
/// # Returns
///
/// Resampled output of length `ceil(signal.len() * P / Q)`.
pub fn resample(signal: &[f64], p: usize, q: usize, filter_order: usize) -> Vec<f64> {
    assert!(p >= 1, "upsample factor P must be >= 1");
    assert!(q >= 1, "downsample factor Q must be >= 1");

    let g = gcd(p, q);
    let p = p / g;
    let q = q / g;

    if p == 1 && q == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        4 * p.max(q) * 10 + 1
    } else {
        filter_order
    };

    let cutoff = 0.9 / p.max(q) as f64;
    let prototype = design_lowpass(num_taps, cutoff);
    let half = (num_taps - 1) / 2;

    let out_len = (signal.len() * p).div_ceil(q);
    let mut output = Vec::with_capacity(out_len);

    for m in 0..out_len {
        let base = m * q + half;
        let mut acc = 0.0;
        let mut t = base % p;
        while t < num_taps && t <= base {
            let idx = (base - t) / p;
            if idx < signal.len() {
                acc += prototype[t] * signal[idx];
            }
            t += p;
        }
        // Scale by P so that zero-stuffing does not lose gain
        output.push(acc * p as f64);
    }

    output
}

/// Resample an impulse response so that its frequency response is preserved.
///
/// The response is treated as one period of a circular filter, matching how the
/// Hammerstein branch applies it: its DFT bins are copied onto the grid of the new
/// length `round(len · to/from)` and transformed back. A discrete impulse response
/// carries an implicit `1/fs` time step, so the bins are copied without the
/// `to/from` interpolation gain, which keeps the DC gain (sum of taps) exact.
pub fn resample_impulse_response(ir: &Signal, sampling_rate: f64) -> Result<Signal> {
    if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(Error::domain(format!(
            "target sampling rate must be finite and positive, got {sampling_rate}"
        )));
    }
    let from = ir.sampling_rate();
    if from == sampling_rate {
        return Ok(ir.clone());
    }
    let n = ir.len();
    if n == 0 {
        return ir.with_sampling_rate(sampling_rate);
    }
    let m = (n as f64 * sampling_rate / from).round() as usize;
    if m == 0 {
        return Err(Error::domain(format!(
            "a {n}-sample impulse response has no samples at {sampling_rate} Hz"
        )));
    }

    let forward = Fft::new(n);
    let inverse = Fft::new(m);
    let channels = ir
        .channels()
        .iter()
        .map(|c| {
            let mut bins = forward.forward_real(c);
            // An even-length Nyquist bin holds both ±fs/2 halves; split it when it
            // stops being the Nyquist bin
            if n % 2 == 0 && m > n {
                bins[n / 2] *= 0.5;
            }
            bins.resize(inverse.bins(), Complex::new(0.0, 0.0));
            inverse.inverse_real(&bins)
        })
        .collect();
    tracing::debug!(from, to = sampling_rate, len = m, "resampled impulse response");
    Signal::new(channels, sampling_rate, ir.labels().to_vec())
}
