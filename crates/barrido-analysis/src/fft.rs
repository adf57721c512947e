//! FFT wrapper for real-valued signals

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// FFT processor with cached forward and inverse plans.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self {
            fft,
            ifft,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bins of a real-input spectrum (DC to Nyquist).
    pub fn bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Perform forward FFT on real input
    ///
    /// The input is zero-padded (or truncated) to the FFT size. Returns the
    /// `size/2 + 1` bins from DC to Nyquist.
    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.bins());
        buffer
    }

    /// Perform inverse FFT of a half spectrum into `size` real samples
    ///
    /// Bins beyond `size/2 + 1` are ignored and missing bins are treated as zero.
    /// The negative frequencies are the conjugate mirror of the positive ones, so
    /// the imaginary parts of the DC and (for even sizes) Nyquist bins do not
    /// contribute. Output is normalized by `1/size`.
    pub fn inverse_real(&self, spectrum: &[Complex<f64>]) -> Vec<f64> {
        let n = self.size;
        let zero = Complex::new(0.0, 0.0);
        let bin = |k: usize| spectrum.get(k).copied().unwrap_or(zero);

        let mut buffer = vec![zero; n];
        for k in 0..self.bins().min(n) {
            buffer[k] = bin(k);
        }
        // Mirror for negative frequencies (conjugate symmetry)
        for k in 1..n.div_ceil(2) {
            buffer[n - k] = bin(k).conj();
        }

        self.ifft.process(&mut buffer);

        let scale = 1.0 / n as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}
