//! FFT convolution of [`Signal`]s.
//!
//! The Hammerstein branch's linear block is a *circular* convolution over the
//! length-matched pair (signal, impulse response): both are zero-padded to the
//! longer of the two and multiplied bin by bin.
//!
//! ```text
//! y = IFFT( FFT(x) · FFT(h) )
//! ```

use barrido_core::{Result, Signal, merge_lengths};

use crate::spectrum::{fourier_transform, inverse_fourier_transform};

/// Circular convolution of `signal` with `filter` after zero-padding the shorter
/// of the two to the longer's length.
///
/// A single-channel operand is broadcast over the other's channels. Both must
/// share a sampling rate.
pub fn circular_convolve(signal: &Signal, filter: &Signal) -> Result<Signal> {
    let (signal, filter) = merge_lengths(signal, filter);
    if signal.is_empty() {
        // Nothing to transform; let the elementwise product validate rate and channels
        return signal.multiply(&filter);
    }
    let product = fourier_transform(&signal)?.multiply(&fourier_transform(&filter)?)?;
    inverse_fourier_transform(&product)
}
