//! Barrido Analysis - Sweep synthesis and spectral primitives
//!
//! This crate provides the measurement-side tools of the workspace:
//!
//! - [`sweep`] - Phase-synchronized (Novak) exponential sweeps and their analytic inverse
//! - [`fft`] - FFT wrapper for real-valued signals
//! - [`spectrum`] - Spectra of [`Signal`](barrido_core::Signal)s and the transforms between them
//! - [`convolve`] - Circular FFT convolution
//! - [`resample`] - Polyphase rational resampling and spectral impulse-response resampling
//!
//! ## Example Workflow
//!
//! ```rust
//! use barrido_analysis::sweep::{NovakSweep, SweepParameters};
//!
//! // 1. Generate the excitation
//! let sweep = NovakSweep::sine(SweepParameters::new(8000.0, 50.0, 3000.0, 8000)).unwrap();
//! let excitation = sweep.generate().unwrap();
//!
//! // 2. Run it through the system under test (here: the identity)
//! let response = excitation.clone();
//!
//! // 3. Deconvolve; the linear impulse response starts at sample 0
//! let ir = sweep.deconvolve(&response).unwrap();
//! let harmonics = sweep.harmonic_impulse_responses(&ir, 3, 256).unwrap();
//! assert_eq!(harmonics.len(), 3);
//! ```

pub mod convolve;
pub mod fft;
pub mod resample;
pub mod spectrum;
pub mod sweep;

pub use convolve::circular_convolve;
pub use fft::Fft;
pub use resample::resample_impulse_response;
pub use spectrum::{Spectrum, fourier_transform, inverse_fourier_transform};
pub use sweep::{NovakSweep, SweepParameters, SweepPhase};
