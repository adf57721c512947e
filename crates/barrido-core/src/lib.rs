//! Barrido Core - signal values for nonlinear system identification
//!
//! This crate provides the value types shared by the rest of the workspace:
//!
//! - [`Signal`] - Immutable multi-channel sample buffer with sampling rate and labels
//! - [`merge_lengths`] - Zero-padding merge used before spectral multiplication
//! - [`Error`] / [`Result`] - Shared error type for sweeps, transforms and models
//!
//! # Example
//!
//! ```rust
//! use barrido_core::{Signal, merge_lengths};
//!
//! let a = Signal::mono(vec![1.0, 2.0], 48000.0, "a").unwrap();
//! let b = Signal::impulse(48000.0, 4).unwrap();
//!
//! let (a, b) = merge_lengths(&a, &b);
//! let product = a.multiply(&b).unwrap();
//! assert_eq!(product.channel(0).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
//! ```

pub mod error;
pub mod signal;

pub use error::{Error, Result};
pub use signal::{DEFAULT_SAMPLING_RATE, Signal, broadcast_count, merge_lengths};
